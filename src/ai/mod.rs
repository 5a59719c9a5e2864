//! Generative model integration
//!
//! The front-ends talk to the hosted model through [`GenerativeModel`]. The
//! production implementation calls the Gemini API; [`MockModelClient`] backs
//! the tests.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockModelClient;

use crate::upload::UploadedImage;
use crate::Result;
use async_trait::async_trait;

/// Content handed to the model for a single generation.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRequest {
    Text(String),
    TextAndImage(String, UploadedImage),
    Image(UploadedImage),
}

impl ContentRequest {
    pub fn prompt(&self) -> Option<&str> {
        match self {
            Self::Text(prompt) | Self::TextAndImage(prompt, _) => Some(prompt),
            Self::Image(_) => None,
        }
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        match self {
            Self::Text(_) => None,
            Self::TextAndImage(_, image) | Self::Image(image) => Some(image),
        }
    }
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(&self, request: ContentRequest) -> Result<String>;
}
