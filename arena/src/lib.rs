pub use charging::*;
pub use config::*;
pub use errors::*;
pub use geometry::*;
pub use lifecycle::*;
pub use scoring::*;
pub use session::*;
pub use snapshot::*;
pub use state::*;
pub use team::*;
pub use timer::*;
pub use tokens::*;

#[cfg(test)]
mod arbitrary;
mod charging;
mod config;
mod errors;
mod geometry;
mod lifecycle;
mod scoring;
mod session;
mod snapshot;
mod state;
mod team;
mod timer;
mod tokens;
