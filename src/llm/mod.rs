//! Text generation behind a single-method trait.
//!
//! [`OpenAiChatModel`] talks to an OpenAI-compatible `/chat/completions`
//! endpoint; [`StaticModel`] returns a fixed reply and is what tests and
//! offline runs use.

pub mod openai;
pub mod stub;

pub use openai::OpenAiChatModel;
pub use stub::StaticModel;

use crate::config::PilotConfig;
use crate::error::{Error, Result};

/// Something that turns a prompt into text.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Build the language model named by `config.llm.provider`.
pub fn create_model(config: &PilotConfig) -> Result<Box<dyn LanguageModel>> {
    match config.llm.provider.as_str() {
        "openai" => Ok(Box::new(OpenAiChatModel::from_config(config)?)),
        "static" => Ok(Box::new(StaticModel::new(config.llm.static_reply.clone()))),
        other => Err(Error::Configuration(format!(
            "unknown llm provider {other:?} (expected \"openai\" or \"static\")"
        ))),
    }
}
