//! A bunch of wrap errors.

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors enum mapping global custom errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Core error: {0}")]
    Core(#[from] ringview_core::error::Error),
    #[error("Create file error: {0}")]
    CreateFile(String),
    #[error("Open file error: {0}")]
    OpenFile(String),
    #[error("Serde yaml error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    #[error("Invalid logging level: {0}")]
    InvalidLoggingLevel(String),
    #[error("Cannot find home directory")]
    HomeDir,
    #[error("Cannot find parent directory")]
    ParentDir,
}
