use thiserror::Error;

/// Error types for the package index.
///
/// Lookup failures never propagate into finder predicates: callers of the
/// async entry points log these and degrade to a not-found state.
#[derive(Error, Debug)]
pub enum PypiError {
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("package not found: {0}")]
    PackageNotFound(String),

    #[error("registry response was not understood: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, PypiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PypiError::PackageNotFound("flask".into());
        assert_eq!(error.to_string(), "package not found: flask");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no METADATA");
        let error: PypiError = io_err.into();
        assert!(error.to_string().contains("I/O error"));
    }
}
