//! Error type shared by the playlist store, the persistence adapter and the
//! session controller.
//!
//! Pipeline failures are not represented here: they arrive as
//! `PipelineEvent::Error` and are handled by the controller's state machine.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JukeboxError {
    /// The UI layer asked for a playlist slot that does not exist.
    IndexOutOfRange { index: usize, len: usize },

    /// A track's locator does not resolve to playable bytes right now.
    TrackUnavailable { index: usize, locator: String },

    /// Malformed playlist text.
    Playlist(String),

    /// Filesystem access failed.
    Io(String),

    /// The media pipeline could not be created.
    Pipeline(String),

    /// Settings could not be loaded or failed validation.
    Config(String),
}

impl fmt::Display for JukeboxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JukeboxError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range (playlist has {} tracks)", index, len)
            }
            JukeboxError::TrackUnavailable { index, locator } => {
                write!(f, "Track {} not found: {}", index, locator)
            }
            JukeboxError::Playlist(msg) => write!(f, "Playlist error: {}", msg),
            JukeboxError::Io(msg) => write!(f, "IO error: {}", msg),
            JukeboxError::Pipeline(msg) => write!(f, "Pipeline error: {}", msg),
            JukeboxError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for JukeboxError {}

pub type Result<T> = std::result::Result<T, JukeboxError>;

impl From<std::io::Error> for JukeboxError {
    fn from(err: std::io::Error) -> Self {
        JukeboxError::Io(err.to_string())
    }
}

impl From<::config::ConfigError> for JukeboxError {
    fn from(err: ::config::ConfigError) -> Self {
        JukeboxError::Config(err.to_string())
    }
}
