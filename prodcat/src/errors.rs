//! Definition of errors.

use thiserror::Error;

pub type Result<T, E = ProdcatError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ProdcatError {
    #[error(transparent)]
    InvalidModel(#[from] InvalidModelError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error(transparent)]
    InvalidData(#[from] InvalidDataError),

    #[error(transparent)]
    ArtifactMismatch(#[from] ArtifactMismatchError),

    #[error(transparent)]
    CastError(#[from] core::num::TryFromIntError),

    #[error(transparent)]
    CsvError(#[from] csv::Error),

    #[error(transparent)]
    DecodeError(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    EncodeError(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl ProdcatError {
    pub(crate) fn invalid_model<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidModel(InvalidModelError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }

    pub(crate) fn invalid_data<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidData(InvalidDataError { msg: msg.into() })
    }

    pub(crate) fn artifact_mismatch<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::ArtifactMismatch(ArtifactMismatchError { msg: msg.into() })
    }

    /// Returns `true` if the error only concerns a single query and the caller may keep serving.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ArtifactMismatch(_))
    }
}

/// Error used when the model is invalid.
#[derive(Debug, Error)]
#[error("InvalidModelError: {msg}")]
pub struct InvalidModelError {
    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the argument is invalid.
#[derive(Debug, Error)]
#[error("InvalidArgumentError: {arg}: {msg}")]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

/// Error used when the training data cannot be used.
#[derive(Debug, Error)]
#[error("InvalidDataError: {msg}")]
pub struct InvalidDataError {
    pub(crate) msg: String,
}

/// Error used when persisted artifacts do not belong together.
#[derive(Debug, Error)]
#[error("ArtifactMismatchError: {msg}")]
pub struct ArtifactMismatchError {
    pub(crate) msg: String,
}
