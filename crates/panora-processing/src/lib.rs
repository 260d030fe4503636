//! Panora Processing Library
//!
//! The validation gate every upload passes before any byte is stored:
//! decode, format allow-list, minimum dimensions and minimum aspect ratio.

pub mod metadata;
pub mod validator;

pub use metadata::{AcceptedFormat, ImageMetadata};
pub use validator::{ImageValidator, ValidationError};
