//! Error types, split by how far a failure is allowed to travel.
//!
//! * [`FstrmError`] is fatal for the connection it happened on.
//! * [`DecodeError`] only costs the current frame.
//! * [`Error`] is what a connection task finally returns.

use crate::fstrm::CONTROL_FRAME_LENGTH_MAX;
use std::io;
use thiserror::Error;

/// Frame Streams protocol violations. The connection should be closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FstrmError {
    #[error("control frame size {0} exceeds the maximum of {max}", max = CONTROL_FRAME_LENGTH_MAX)]
    ControlFrameTooLarge(u32),

    #[error("control frame size {0} is too short to hold a control type")]
    ControlFrameTooShort(u32),

    #[error("unknown control frame type {0}")]
    UnknownControlType(u32),
}

/// Reasons a single data frame did not produce an event.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid dnstap envelope: {0}")]
    Envelope(#[from] prost::DecodeError),

    #[error("dnstap frame of type {0} has no message")]
    MissingMessage(i32),

    #[error("unsupported dnstap message type {0}")]
    UnknownMessageType(i32),

    #[error("invalid DNS payload: {0}")]
    InvalidDns(#[source] io::Error),

    #[error("DNS message has no question")]
    NoQuestion,
}

/// Errors that end a connection.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Fstrm(#[from] FstrmError),
}

/// Returns early with a [`std::io::Error`] of the given kind.
///
/// ```ignore
/// bail!(InvalidData, "invalid Class({})", class);
/// ```
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {{
        return Err(std::io::Error::new(
            std::io::ErrorKind::$kind,
            format!($($arg)*),
        )
        .into());
    }};
}
