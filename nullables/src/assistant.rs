//! Nullable configuration assistant.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use ballot_client::{AssistError, ConfigAssistant};

/// Returns a fixed configuration string and counts calls.
#[derive(Debug)]
pub struct NullAssistant {
    response: String,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl NullAssistant {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every later call fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullAssistant {
    fn default() -> Self {
        Self::new("null-zkp-configuration")
    }
}

#[async_trait]
impl ConfigAssistant for NullAssistant {
    async fn configure(&self, candidate_options: &[String]) -> Result<String, AssistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AssistError::Request("null assistant set to fail".into()));
        }
        if candidate_options.len() < 2 {
            return Err(AssistError::TooFewOptions(candidate_options.len()));
        }
        Ok(self.response.clone())
    }
}
