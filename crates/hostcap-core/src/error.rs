//! Error taxonomy shared by all capability facades.

use thiserror::Error;

/// Result alias used throughout the capability layer.
pub type CapResult<T> = Result<T, CapError>;

/// Failure classes a facade call can surface.
///
/// Facade errors are reported to the harness as failed checks; they never
/// abort a verification run. `CaptureFailure` is special-cased by the
/// stack-trace module, which degrades to a partial trace instead of
/// returning it.
#[derive(Debug, Error)]
pub enum CapError {
    /// A caller-supplied value is outside the operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not legal in the handle's current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The handle does not name a live resource.
    #[error("invalid handle: {0}")]
    InvalidHandle(u64),

    /// A raw signal number has no corresponding [`crate::signal::SignalKind`].
    #[error("unknown signal: {0}")]
    UnknownSignal(i64),

    /// The host refused to start a worker thread.
    #[error("thread creation failed: {0}")]
    ThreadCreateFailed(String),

    /// The named file, directory, or constant does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The host denied access to the path.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Creation target already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Directory deletion refused because entries remain.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// A bounded wait exhausted its budget.
    #[error("timed out: {0}")]
    Timeout(String),

    /// Stack capture could not complete; the partial trace is still usable.
    #[error("stack capture failed: {0}")]
    CaptureFailure(String),

    /// Unclassified host I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_context() {
        let err = CapError::InvalidArgument("chunk size must be non-zero".into());
        assert_eq!(
            err.to_string(),
            "invalid argument: chunk size must be non-zero"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: CapError = io.into();
        assert!(matches!(err, CapError::Io(_)));
    }
}
