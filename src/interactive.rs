//! Terminal front-end
//!
//! Each round asks for a prompt and an optional image path, then sends both to
//! the model and prints the reply. The round itself ([`Session::submit`]) only
//! writes to a `Write` sink; [`run`] wires it to a readline editor and stdout.

use crate::ai::GenerativeModel;
use crate::facade;
use crate::upload::{UploadedImage, ALLOWED_EXTENSIONS};
use crate::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub const HEADER: &str = "Gemini Application";
const QUIT_COMMAND: &str = "/quit";

/// What happened to a submitted round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Answered,
    /// Neither prompt nor image was given.
    Skipped,
    /// The image could not be loaded; the model was not called.
    ImageRejected,
}

pub struct Session {
    model: Arc<dyn GenerativeModel>,
}

impl Session {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn print_header<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{}", HEADER)?;
        writeln!(out, "{}", "=".repeat(HEADER.len()))?;
        writeln!(
            out,
            "Type a prompt, then optionally the path of an image ({}). {} exits.",
            ALLOWED_EXTENSIONS.join(", "),
            QUIT_COMMAND
        )?;
        Ok(())
    }

    /// Run one prompt/image round and render the outcome to `out`.
    pub async fn submit<W: Write>(
        &self,
        prompt: &str,
        image_path: &str,
        out: &mut W,
    ) -> Result<Submission> {
        let image_path = image_path.trim().trim_matches(|c: char| c == '"' || c == '\'');

        let image = if image_path.is_empty() {
            None
        } else {
            match UploadedImage::from_path(Path::new(image_path)) {
                Ok(image) => {
                    let (width, height) = image.dimensions();
                    writeln!(
                        out,
                        "Uploaded Image: {} ({}x{}, {})",
                        image_path,
                        width,
                        height,
                        image.mime_type()
                    )?;
                    Some(image)
                }
                Err(e) => {
                    tracing::warn!("Could not load image {}: {}", image_path, e);
                    writeln!(out, "Could not load image: {}", e)?;
                    return Ok(Submission::ImageRejected);
                }
            }
        };

        if prompt.trim().is_empty() && image.is_none() {
            return Ok(Submission::Skipped);
        }

        let response = facade::get_response(self.model.as_ref(), prompt, image).await;

        writeln!(out)?;
        writeln!(out, "The Response is")?;
        writeln!(out, "{}", response)?;
        writeln!(out)?;
        Ok(Submission::Answered)
    }
}

/// Interactive loop on the current terminal until EOF, Ctrl-C or `/quit`.
pub async fn run(model: Arc<dyn GenerativeModel>) -> Result<()> {
    let session = Session::new(model);
    let mut editor = DefaultEditor::new()?;
    let mut stdout = std::io::stdout();

    session.print_header(&mut stdout)?;

    loop {
        let Some(prompt) = read_line(&mut editor, "Input Prompt: ")? else {
            break;
        };
        if prompt.trim() == QUIT_COMMAND {
            break;
        }

        let Some(image_path) = read_line(&mut editor, "Upload Image (path, blank for none): ")?
        else {
            break;
        };

        session.submit(&prompt, &image_path, &mut stdout).await?;
    }

    println!("Goodbye!");
    Ok(())
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ContentRequest, MockModelClient};
    use crate::upload::sample_png;
    use pretty_assertions::assert_eq;

    fn session(model: &MockModelClient) -> Session {
        Session::new(Arc::new(model.clone()))
    }

    #[tokio::test]
    async fn test_prompt_only_round_prints_reply() {
        let model = MockModelClient::new().with_response("Paris".to_string());
        let mut out = Vec::new();

        let outcome = session(&model)
            .submit("Capital of France?", "", &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Submission::Answered);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("The Response is\nParis\n"));
        assert_eq!(
            model.requests(),
            vec![ContentRequest::Text("Capital of France?".to_string())]
        );
    }

    #[tokio::test]
    async fn test_image_without_prompt_is_sent_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        std::fs::write(&path, sample_png()).unwrap();

        let model = MockModelClient::new().with_response("A red square".to_string());
        let mut out = Vec::new();

        let outcome = session(&model)
            .submit("", &format!("\"{}\"", path.display()), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Submission::Answered);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Uploaded Image:"));
        assert!(printed.contains("4x3"));
        assert!(matches!(
            model.requests().as_slice(),
            [ContentRequest::Image(_)]
        ));
    }

    #[tokio::test]
    async fn test_unsupported_image_skips_model_call() {
        let model = MockModelClient::new();
        let mut out = Vec::new();

        let outcome = session(&model)
            .submit("what is this?", "notes.txt", &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, Submission::ImageRejected);
        assert!(String::from_utf8(out).unwrap().contains("Could not load image"));
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_round_is_skipped() {
        let model = MockModelClient::new();
        let mut out = Vec::new();

        let outcome = session(&model).submit("  ", "", &mut out).await.unwrap();

        assert_eq!(outcome, Submission::Skipped);
        assert!(out.is_empty());
        assert_eq!(model.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_error_is_rendered_as_text() {
        let model = MockModelClient::new().failing_with("network unreachable".to_string());
        let mut out = Vec::new();

        session(&model).submit("hi", "", &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Error generating response:"));
        assert!(printed.contains("network unreachable"));
    }

    #[test]
    fn test_header_mentions_quit_command() {
        let model = MockModelClient::new();
        let mut out = Vec::new();

        session(&model).print_header(&mut out).unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with(HEADER));
        assert!(printed.contains(QUIT_COMMAND));
    }
}
