use std::io::Cursor;

use image::{GenericImageView, ImageReader};
use panora_core::constants::{MIN_ASPECT_RATIO, MIN_IMAGE_HEIGHT, MIN_IMAGE_WIDTH};
use panora_core::AppError;

use crate::metadata::{AcceptedFormat, ImageMetadata};

/// Reasons an upload is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid image file: {0}")]
    Undecodable(String),

    #[error("Invalid image format. Only JPEG and PNG are allowed.")]
    UnsupportedFormat { format: String },

    #[error(
        "Image dimensions too small. Minimum {}x{} pixels.",
        MIN_IMAGE_WIDTH,
        MIN_IMAGE_HEIGHT
    )]
    DimensionsTooSmall { width: u32, height: u32 },

    #[error("Aspect ratio must be at least {}:1.", MIN_ASPECT_RATIO)]
    AspectRatioTooNarrow { width: u32, height: u32 },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationFailed(err.to_string())
    }
}

/// Image upload validator
///
/// Pure function of the payload: the same bytes always yield the same
/// verdict. Decoding is CPU-bound, so async callers should run
/// [`ImageValidator::validate`] on the blocking pool.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    max_file_size: usize,
}

impl ImageValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Run every check in order and stop at the first failure.
    pub fn validate(&self, data: &[u8]) -> Result<ImageMetadata, ValidationError> {
        self.validate_file_size(data.len())?;

        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ValidationError::Undecodable(e.to_string()))?;

        let format = match reader.format() {
            Some(detected) => AcceptedFormat::from_image_format(detected).ok_or_else(|| {
                ValidationError::UnsupportedFormat {
                    format: format!("{:?}", detected),
                }
            })?,
            None => {
                return Err(ValidationError::Undecodable(
                    "unrecognized image data".to_string(),
                ))
            }
        };

        let img = reader
            .decode()
            .map_err(|e| ValidationError::Undecodable(e.to_string()))?;
        let (width, height) = img.dimensions();

        check_dimensions(width, height)?;

        Ok(ImageMetadata {
            width,
            height,
            format,
            size_bytes: data.len() as u64,
        })
    }
}

/// Minimum size, then minimum width:height ratio (inclusive).
pub fn check_dimensions(width: u32, height: u32) -> Result<(), ValidationError> {
    if width < MIN_IMAGE_WIDTH || height < MIN_IMAGE_HEIGHT {
        return Err(ValidationError::DimensionsTooSmall { width, height });
    }

    // Integer form of width / height >= MIN_ASPECT_RATIO.
    if u64::from(width) < u64::from(height) * u64::from(MIN_ASPECT_RATIO) {
        return Err(ValidationError::AspectRatioTooNarrow { width, height });
    }

    Ok(())
}
