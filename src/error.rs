//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment file error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

pub type Result<T> = std::result::Result<T, Error>;
