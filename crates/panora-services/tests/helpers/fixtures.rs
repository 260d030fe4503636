use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use panora_services::UploadedImage;

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    })
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut cursor, format)
        .expect("Failed to encode fixture image");
    cursor.into_inner()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient(width, height))
        .to_rgba8()
        .write_to(&mut cursor, ImageFormat::Gif)
        .expect("Failed to encode fixture image");
    cursor.into_inner()
}

pub fn upload(filename: &str, data: Vec<u8>) -> UploadedImage {
    UploadedImage::new(filename, data)
}
