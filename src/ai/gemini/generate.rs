use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::{ContentRequest, GenerativeModel};
use crate::upload::UploadedImage;
use crate::{Error, Result};
use async_trait::async_trait;

/// Gemini-hosted model answering text and vision prompts.
pub struct GeminiClient {
    http: GeminiHttpClient,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new(api_key, model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn image_part(image: &UploadedImage) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().to_string(),
                data: image.to_base64(),
            },
        }
    }

    fn build_request(request: &ContentRequest) -> GenerateContentRequest {
        let parts = match request {
            ContentRequest::Text(prompt) => vec![Part::Text {
                text: prompt.clone(),
            }],
            ContentRequest::TextAndImage(prompt, image) => vec![
                Part::Text {
                    text: prompt.clone(),
                },
                Self::image_part(image),
            ],
            ContentRequest::Image(image) => vec![Self::image_part(image)],
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        }
    }

    /// Joins every text part of the first candidate.
    fn extract_text(response: &GenerateContentResponse) -> Result<String> {
        let Some(candidate) = response.candidates.first() else {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(Error::AiProvider(format!(
                "Gemini returned no response: {}",
                reason
            )));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.is_empty() {
            return Err(Error::AiProvider(format!(
                "No text in Gemini response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(&self, request: ContentRequest) -> Result<String> {
        tracing::debug!(
            "Sending generateContent to {} (prompt: {}, image: {})",
            self.model(),
            request.prompt().is_some(),
            request.image().map(|i| i.mime_type()).unwrap_or("none")
        );

        let body = Self::build_request(&request);
        let response: GenerateContentResponse = self.http.generate_content(&body).await?;

        Self::extract_text(&response)
    }
}
