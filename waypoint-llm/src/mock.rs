//! Mock LLM client for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::client::{LlmClient, LlmError};

/// Scripted LLM client for unit tests.
///
/// Returns the configured responses in order, repeating the last one
/// once the script is exhausted. A failing mock returns an error on
/// every call.
pub struct MockLlm {
    model_id: String,
    responses: Mutex<Vec<String>>,
    fail_with: Option<String>,
    call_count: AtomicU32,
}

impl MockLlm {
    /// Create a mock that always returns `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            responses: Mutex::new(vec![response.into()]),
            fail_with: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Create a mock that returns the given responses in sequence.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            responses: Mutex::new(responses),
            fail_with: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            responses: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Number of times `complete` was called.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst) as usize;

        if let Some(msg) = &self.fail_with {
            return Err(LlmError::RequestFailed(msg.clone()));
        }

        let responses = self.responses.lock().unwrap();
        responses
            .get(call)
            .or_else(|| responses.last())
            .cloned()
            .ok_or_else(|| LlmError::Unavailable("Mock has no scripted responses".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_scripted_responses_in_order() {
        let mock = MockLlm::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(mock.complete("p").await.unwrap(), "first");
        assert_eq!(mock.complete("p").await.unwrap(), "second");
        // Script exhausted: repeats the last response
        assert_eq!(mock.complete("p").await.unwrap(), "second");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors_every_call() {
        let mock = MockLlm::failing("boom");
        assert!(mock.complete("p").await.is_err());
        assert!(mock.complete("p").await.is_err());
        assert_eq!(mock.call_count(), 2);
    }
}
