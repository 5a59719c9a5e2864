use super::{ContentRequest, GenerativeModel};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory model that replays canned replies and records every request.
#[derive(Clone)]
pub struct MockModelClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
    requests: Arc<Mutex<Vec<ContentRequest>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Make every call fail with `Error::AiProvider(message)`.
    pub fn failing_with(mut self, message: String) -> Self {
        self.failure = Some(message);
        self
    }

    pub fn requests(&self) -> Vec<ContentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeModel for MockModelClient {
    async fn generate_content(&self, request: ContentRequest) -> Result<String> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(message) = &self.failure {
            return Err(Error::AiProvider(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!(
                "Mock reply to: {}",
                request.prompt().unwrap_or("<image>")
            ))
        } else {
            Ok(responses[(count - 1) % responses.len()].clone())
        }
    }
}
