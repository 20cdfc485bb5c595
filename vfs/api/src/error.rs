use std::io;

/// Result alias used throughout the virtual file API.
pub type Result<T> = std::result::Result<T, VfsError>;

/// Errors surfaced by virtual files and adaptors.
///
/// "Not found" is never an error: lookups return `Ok(None)` instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VfsError {
    /// A required argument was missing or malformed.
    #[error("{0} is null")]
    Null(&'static str),
    /// An argument was present but could not be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The object handed to an adaptor is not of a type it understands.
    #[error("Not a VirtualFile: {0}")]
    TypeMismatch(String),
    /// The virtual file has been closed.
    #[error("virtual file closed: {0}")]
    Closed(String),
    /// No adaptor has been installed into [`crate::AbstractVfs`].
    #[error("Cannot load VFS adaptor")]
    AdaptorNotInstalled,
    /// Some other internal invariant does not hold.
    #[error("illegal state: {0}")]
    IllegalState(String),
    /// The backing filesystem or archive reported a failure.
    #[error("{context}")]
    Backend {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

impl VfsError {
    /// Wrap a backend failure with a description of the failed operation.
    pub fn backend(context: impl Into<String>, error: io::Error) -> Self {
        VfsError::Backend {
            context: context.into(),
            error,
        }
    }

    /// `true` for [`VfsError::Null`] and [`VfsError::InvalidInput`].
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, VfsError::Null(_) | VfsError::InvalidInput(_))
    }

    /// `true` for every error that reports an illegal state, including
    /// operations on closed files and a missing adaptor.
    pub fn is_illegal_state(&self) -> bool {
        matches!(
            self,
            VfsError::Closed(_) | VfsError::AdaptorNotInstalled | VfsError::IllegalState(_)
        )
    }
}

impl From<VfsError> for io::Error {
    fn from(error: VfsError) -> Self {
        match error {
            VfsError::Backend { error, .. } => error,
            VfsError::Null(_) | VfsError::InvalidInput(_) | VfsError::TypeMismatch(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, error)
            }
            other => io::Error::other(other),
        }
    }
}
