//! Decoding of user-supplied images
//!
//! Both front-ends hand the model a validated bitmap: the server receives a
//! base64 data URL, the interactive session reads a file from disk. Either way
//! the bytes are decoded once with the `image` crate so that anything which is
//! not a readable picture is rejected before the model is called.

use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// File extensions accepted by the interactive uploader.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An image owned by a single request and dropped once the model call returns.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    mime_type: &'static str,
    width: u32,
    height: u32,
}

impl UploadedImage {
    /// Validate raw bytes as a bitmap and capture its format and dimensions.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        let decoded = image::load_from_memory_with_format(&bytes, format)?;

        Ok(Self {
            mime_type: format.to_mime_type(),
            width: decoded.width(),
            height: decoded.height(),
            bytes,
        })
    }

    /// Read an image file, restricted to [`ALLOWED_EXTENSIONS`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                Error::UnsupportedImage(format!("{} has no extension", path.display()))
            })?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::UnsupportedImage(format!(
                "'{}' (expected one of: {})",
                extension,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Standard base64 of the original bytes, as sent inline to the model.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Decode a `data:<mime>;base64,<payload>` URL into an image.
///
/// Everything up to the first comma is discarded; the remainder must be
/// standard base64.
pub fn decode_data_url(data_url: &str) -> Result<UploadedImage> {
    let (_, payload) = data_url.split_once(',').ok_or_else(|| {
        Error::DataUrl("missing ',' separator before image payload".to_string())
    })?;

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    tracing::debug!("Decoded {} image bytes from data URL", bytes.len());

    UploadedImage::from_bytes(bytes)
}

#[cfg(test)]
pub(crate) fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([255, 0, 0, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
