//! Error types for rolebits

use thiserror::Error;

/// Errors returned by the access-control kernel and its storage.
///
/// `AccessDenied` and `AlreadyInitialized` are the kernel's own failures;
/// both abort the call before anything is written or emitted.
#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied")]
    AccessDenied,

    #[error("already initialized")]
    AlreadyInitialized,

    #[error("not initialized")]
    NotInitialized,

    #[error("storage error: {0}")]
    Storage(#[from] heed::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Static code for logs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::AlreadyInitialized => "already_initialized",
            Self::NotInitialized => "not_initialized",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Decode(_) => "decode",
        }
    }
}

/// Result type alias for rolebits operations
pub type Result<T> = std::result::Result<T, Error>;
