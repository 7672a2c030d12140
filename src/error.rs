//! Error taxonomy shared by the embedding, memory, and language-model layers.
//!
//! Presentation layers rely on [`Error::is_user_error`] and
//! [`Error::is_transient`] to tell a corrective message apart from a
//! "try again" message.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied argument was rejected (empty text, bad project id).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Required configuration (usually the provider credential) is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote embedding or completion call failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// A vector did not match the dimension of the index it was meant for.
    #[error("embedding has {actual} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The similarity index rejected an operation.
    #[error("index error: {0}")]
    Index(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Errors the caller can fix by changing input or configuration.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Configuration(_))
    }

    /// Errors worth retrying unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Error::InvalidInput("x".into()).is_user_error());
        assert!(Error::Configuration("x".into()).is_user_error());
        assert!(!Error::Provider("x".into()).is_user_error());
        assert!(Error::Provider("x".into()).is_transient());
        assert!(!Error::Index("x".into()).is_transient());
        assert!(
            !Error::DimensionMismatch {
                expected: 3,
                actual: 4
            }
            .is_user_error()
        );
    }

    #[test]
    fn storage_error_names_path() {
        let err = Error::storage(
            "/tmp/p1/text_data.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/p1/text_data.json"));
        assert!(msg.contains("denied"));
    }
}
