//! OCR intake: turns a photographed or uploaded question into text.

mod client;
mod image;
mod response;

pub use client::{OcrSpaceClient, TextExtractor};
pub use image::{ImageHandle, LoadedImage};
