//! A bunch of wrap errors.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
///
/// `Transport`, `Decode` and `Validation` are the failure modes of the remote
/// surface; the remaining variants are engine-internal. None of them is ever
/// escalated into a crash or a retry: a failed call leaves the last-known-good
/// state in place until the next successful refresh.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to parse server response as {0}: {1}")]
    Decode(&'static str, String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Acquire lock failed")]
    Lock,
    #[error("Event channel closed")]
    ChannelClosed,
}
