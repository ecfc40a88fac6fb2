use arena::{Snapshot, StateDocument};
use serde::{Deserialize, Serialize};

/// A request to the referee, one JSON object per line.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Start a new game, discarding the current one.
    Start,
    Pause,
    Resume,
    Stop,
    /// The latest positions from the tracker.
    ///
    /// The `robots` and `objects` fields sit next to `type`.
    Snapshot(Snapshot),
    /// Only ask for the current state.
    State,
    /// The referee should shut down. This request gets no response.
    Bye,
}

/// The answer to every request except [`Request::Bye`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    State(StateDocument),
    Error { error: String },
}

impl Response {
    pub fn error(err: impl std::fmt::Display) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }
}
