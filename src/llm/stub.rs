use std::sync::Mutex;

use super::LanguageModel;
use crate::error::Result;

/// Returns the same reply for every prompt and remembers the prompts it saw.
#[derive(Debug)]
pub struct StaticModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl StaticModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt passed to [`generate`](LanguageModel::generate), oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl LanguageModel for StaticModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        match self.prompts.lock() {
            Ok(mut p) => p.push(prompt.to_string()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_string()),
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "static"
    }
}
