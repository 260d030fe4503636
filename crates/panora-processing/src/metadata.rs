//! Metadata extracted from an accepted image

use serde::{Deserialize, Serialize};

/// Formats the catalog stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptedFormat {
    Jpeg,
    Png,
}

impl AcceptedFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            AcceptedFormat::Jpeg => "image/jpeg",
            AcceptedFormat::Png => "image/png",
        }
    }

    pub fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(AcceptedFormat::Jpeg),
            image::ImageFormat::Png => Some(AcceptedFormat::Png),
            _ => None,
        }
    }
}

/// Image metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub format: AcceptedFormat,
    pub size_bytes: u64,
}

impl ImageMetadata {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}
