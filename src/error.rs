use std::io;

use image::ImageError;
use thiserror::Error;

use crate::formats::chr::{CodecError, CodecErrorKind};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Image error: {0}")]
    Image(#[source] ImageError),
    #[error("PNG optimisation failed: {0}")]
    Png(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Process exit code for this failure. 1 and 2 are left to panics and clap.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Codec(e) => match e.kind() {
                CodecErrorKind::InvalidBitmapShape => 3,
                CodecErrorKind::InvalidPixelValue => 4,
                CodecErrorKind::InvalidBankSize => 5,
            },
            ToolError::Io(_) => 6,
            ToolError::Image(_) | ToolError::Png(_) => 7,
            ToolError::Json(_) => 8,
        }
    }
}

impl From<ImageError> for ToolError {
    fn from(err: ImageError) -> Self {
        // Keep file system failures classed as I/O, whichever layer hit them
        match err {
            ImageError::IoError(e) => ToolError::Io(e),
            other => ToolError::Image(other),
        }
    }
}

impl From<oxipng::PngError> for ToolError {
    fn from(err: oxipng::PngError) -> Self {
        ToolError::Png(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::chr::ShapeMismatch;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ToolError::from(CodecError::InvalidBitmapShape {
                mismatch: ShapeMismatch::Rows,
                expected: 8,
                actual: 9,
            }),
            ToolError::from(CodecError::InvalidPixelValue {
                row: 0,
                column: 0,
                value: 4,
            }),
            ToolError::from(CodecError::InvalidBankSize {
                expected: 4096,
                actual: 4095,
            }),
            ToolError::from(io::Error::new(io::ErrorKind::NotFound, "missing")),
            ToolError::Png("bad".to_string()),
        ];

        let mut codes: Vec<u8> = errors.iter().map(ToolError::exit_code).collect();
        assert!(codes.iter().all(|&c| c > 2));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_tile_context_keeps_exit_code() {
        let inner = CodecError::InvalidPixelValue {
            row: 1,
            column: 2,
            value: 9,
        };
        let wrapped = ToolError::from(inner.clone().in_tile(12));
        assert_eq!(wrapped.exit_code(), ToolError::from(inner).exit_code());
        assert!(wrapped.to_string().starts_with("Tile 12:"));
    }

    #[test]
    fn test_image_io_error_is_io() {
        let err = ToolError::from(ImageError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            "missing",
        )));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_io_error_passes_through() {
        let err = ToolError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        match err {
            ToolError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
