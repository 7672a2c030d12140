//! Question answering over a [`LanguageModel`], optionally grounded in recalled memories.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::llm::LanguageModel;

pub const DEFAULT_INSTRUCTIONS: &str = "Answer clearly, concisely, and with evidence if needed.";

const ANSWER_CUE: &str = "Answer:";

pub struct SmartAnswer {
    model: Arc<dyn LanguageModel>,
    instructions: String,
}

impl SmartAnswer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Answer `question`, using `context` passages as supporting material.
    pub fn answer(&self, question: &str, context: &[String]) -> Result<String> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question must be a non-empty string".into()));
        }

        let prompt = self.render_prompt(question.trim(), context);
        let reply = self.model.generate(&prompt)?;
        let answer = extract_answer(&reply);

        if answer.is_empty() {
            return Err(Error::Provider(format!(
                "{} returned an empty answer",
                self.model.model_name()
            )));
        }
        tracing::debug!(
            model = self.model.model_name(),
            context = context.len(),
            "answer generated"
        );
        Ok(answer.to_string())
    }

    fn render_prompt(&self, question: &str, context: &[String]) -> String {
        let mut prompt = format!("{}\n\n", self.instructions);
        if !context.is_empty() {
            prompt.push_str("Context:\n");
            for (i, passage) in context.iter().enumerate() {
                prompt.push_str(&format!("[{}] {}\n", i + 1, passage));
            }
            prompt.push('\n');
        }
        prompt.push_str(&format!("Question: {question}\n{ANSWER_CUE}"));
        prompt
    }
}

/// Trim the reply and drop an echoed `Answer:` prefix.
fn extract_answer(reply: &str) -> &str {
    let reply = reply.trim();
    reply
        .strip_prefix(ANSWER_CUE)
        .map(str::trim_start)
        .unwrap_or(reply)
}
