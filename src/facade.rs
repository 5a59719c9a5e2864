//! Routes a prompt and optional image to the model and normalizes the reply.

use crate::ai::{ContentRequest, GenerativeModel};
use crate::upload::UploadedImage;

/// Prefix of the text returned in place of a reply when the model call fails.
pub const ERROR_PREFIX: &str = "Error generating response:";

/// Pick the request shape for a prompt/image pair.
///
/// A blank prompt next to an image sends the image alone; without an image the
/// prompt is always sent, even when empty.
pub fn build_request(prompt: &str, image: Option<UploadedImage>) -> ContentRequest {
    match image {
        Some(image) if prompt.trim().is_empty() => ContentRequest::Image(image),
        Some(image) => ContentRequest::TextAndImage(prompt.to_string(), image),
        None => ContentRequest::Text(prompt.to_string()),
    }
}

/// Ask the model once and return its text.
///
/// Never fails: any error from the model becomes
/// `"Error generating response: <description>"`.
pub async fn get_response(
    model: &dyn GenerativeModel,
    prompt: &str,
    image: Option<UploadedImage>,
) -> String {
    let request = build_request(prompt, image);
    tracing::debug!(
        "Forwarding request to model (prompt chars: {}, image: {})",
        request.prompt().map(str::len).unwrap_or(0),
        request.image().is_some()
    );

    match model.generate_content(request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Model call failed: {}", e);
            format!("{} {}", ERROR_PREFIX, e)
        }
    }
}
