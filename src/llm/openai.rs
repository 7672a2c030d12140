//! OpenAI chat completions, non-streaming.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::LanguageModel;
use crate::config::PilotConfig;
use crate::error::{Error, Result};
use crate::http;

pub struct OpenAiChatModel {
    client: reqwest::blocking::Client,
    api_key: Secret<String>,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatModel")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn from_config(config: &PilotConfig) -> Result<Self> {
        let api_key = http::require_api_key(config.api_key(), "language model")?;
        let client = http::blocking_client(config.llm.timeout_secs)?;
        Ok(Self {
            client,
            api_key: Secret::new(api_key),
            endpoint: http::endpoint(&config.llm.base_url, "chat/completions"),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        })
    }
}

impl LanguageModel for OpenAiChatModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "chat completion request");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<ChatResponse>())
            .map_err(|e| {
                tracing::warn!(error = %e, model = %self.model, "chat completion failed");
                Error::from(e)
            })?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| Error::Provider("chat completion returned no choices".into()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> PilotConfig {
        let mut config = PilotConfig::default();
        config.llm.base_url = server.url("/v1");
        config.llm.timeout_secs = 5;
        config.credentials.openai_api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn returns_first_choice() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "model": "gpt-3.5-turbo",
                    "messages": [{"role": "user", "content": "Say hi"}],
                    "temperature": 0.0,
                    "max_tokens": 512
                }));
            then.status(200).json_body(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "hi"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ]
            }));
        });

        let model = OpenAiChatModel::from_config(&config_for(&server)).unwrap();
        assert_eq!(model.generate("Say hi").unwrap(), "hi");
        mock.assert();
    }

    #[test]
    fn model_name_is_configurable() {
        let server = MockServer::start();
        let mut config = config_for(&server);
        config.llm.model = "gpt-4".into();
        let model = OpenAiChatModel::from_config(&config).unwrap();
        assert_eq!(model.model_name(), "gpt-4");
    }

    #[test]
    fn no_choices_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({"choices": []}));
        });

        let model = OpenAiChatModel::from_config(&config_for(&server)).unwrap();
        assert!(matches!(model.generate("x"), Err(Error::Provider(_))));
    }

    #[test]
    fn server_error_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(500).body("boom");
        });

        let model = OpenAiChatModel::from_config(&config_for(&server)).unwrap();
        let err = model.generate("x").unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let config = PilotConfig::default();
        assert!(matches!(
            OpenAiChatModel::from_config(&config),
            Err(Error::Configuration(_))
        ));
    }
}
