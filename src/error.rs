//! Common error types for the blur model and its inverse

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by kernel synthesis, the convolution operator and
/// Wiener deconvolution
#[derive(Debug, Error)]
pub enum BlurError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BlurError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BlurError::InvalidParameter("length must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: length must be positive");

        let err = BlurError::ShapeMismatch("kernel 9x9 exceeds image 4x4".to_string());
        assert!(err.to_string().starts_with("Shape mismatch"));

        let err = BlurError::ImageNotFound(PathBuf::from("/missing.png"));
        assert_eq!(err.to_string(), "Image not found: /missing.png");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: BlurError = io.into();
        assert!(matches!(err, BlurError::IoError(_)));
    }
}
