use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Image encoding error: {0}")]
    Encoding(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl ComparisonError {
    pub(crate) fn mismatch(expected: (u32, u32), found: (u32, u32)) -> Self {
        ComparisonError::DimensionMismatch { expected, found }
    }
}

pub type Result<T> = std::result::Result<T, ComparisonError>;
