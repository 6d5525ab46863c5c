//! Error type shared by every stage of mock data generation.

use std::path::PathBuf;

/// Broad category of a [`MockError`].
///
/// Generation and configuration problems are `InvalidArgument` and are raised
/// before any file is touched. Anything that goes wrong while creating or
/// writing files is `Io`. A creation-time patch that the platform cannot
/// perform is `UnsupportedOperation`. Archives that cannot be decoded are
/// `Format`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Io,
    UnsupportedOperation,
    Format,
}

/// Errors raised while generating, writing or reading mock data.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("could not write npy entry: {0}")]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    #[error("could not read npy entry: {0}")]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    #[error("zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed archive {}: {reason}", .path.display())]
    MalformedArchive { path: PathBuf, reason: String },
}

impl MockError {
    /// Shorthand for building an [`MockError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Io(_) => ErrorKind::Io,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            // Writing an entry only fails when the underlying writer does.
            Self::WriteNpy(_) => ErrorKind::Io,
            Self::Zip(zip::result::ZipError::Io(_)) => ErrorKind::Io,
            Self::ReadNpy(_) | Self::Zip(_) | Self::Json(_) | Self::MalformedArchive { .. } => {
                ErrorKind::Format
            }
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(MockError::invalid("zero channels").kind(), ErrorKind::InvalidArgument);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(MockError::from(io).kind(), ErrorKind::Io);
        assert_eq!(
            MockError::UnsupportedOperation("no creation time".into()).kind(),
            ErrorKind::UnsupportedOperation
        );
        let err = MockError::MalformedArchive {
            path: PathBuf::from("data/S0001.npz"),
            reason: "missing entry y".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.to_string(), "malformed archive data/S0001.npz: missing entry y");
    }
}
