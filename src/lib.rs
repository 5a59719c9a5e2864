//! Chat front-ends for a hosted Gemini-API model
//!
//! A web endpoint and an interactive terminal session that forward a prompt
//! and an optional image to the model and display the text it returns.

pub mod ai;
pub mod error;
pub mod facade;
pub mod interactive;
pub mod models;
pub mod server;
pub mod upload;

pub use error::{Error, Result};
