use thiserror::Error;

/// Errors from the document assembly and PDF emission layer.
#[derive(Error, Debug)]
pub enum DocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, DocError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_doc_error_display() {
        let error = DocError::InvalidGeometry("margin exceeds page".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid page geometry: margin exceeds page"
        );
    }

    #[test]
    fn test_doc_error_from_io_error() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let error = DocError::from(io_error);

        match error {
            DocError::Io(ref err) => assert_eq!(err.kind(), ErrorKind::NotFound),
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_all_doc_error_variants_display() {
        let errors = vec![
            DocError::InvalidBitmap("zero width".to_string()),
            DocError::InvalidGeometry("negative margin".to_string()),
            DocError::FontError("unknown font".to_string()),
            DocError::EncodingError("unmappable character".to_string()),
            DocError::CompressionError("deflate failed".to_string()),
            DocError::InvalidReference("image 'Blk3' not registered".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocError>();
    }
}
