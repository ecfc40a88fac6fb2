mod driver;
mod protocol;
mod recording;
pub use driver::*;
pub use protocol::*;
pub use recording::*;
