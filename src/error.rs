//! Errors raised by the reporter.
//!
//! Usage errors (`AlreadyDisabled`, `UnknownSink`, `UnknownSession`) point at
//! a bug in the caller or in the other side of the channel and are never
//! recovered from silently. Protocol errors are fatal for the one message that
//! carried them.

use crate::uniq_id::UniqID;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("enable scope is already disabled")]
    AlreadyDisabled,

    #[error("sink {0} is not registered with this reporter")]
    UnknownSink(UniqID),

    #[error("no progress session with id `{0}`")]
    UnknownSession(String),

    #[error("progress session `{0}` already exists")]
    DuplicateSession(String),

    #[error("malformed protocol message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no remote channel is attached to this reporter")]
    NoRemoteChannel,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ReporterError> = std::result::Result<T, E>;
