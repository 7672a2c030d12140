pub mod ask;
pub mod memory;

use std::sync::Arc;

use anyhow::{Context, Result};
use promptpilot::config::PilotConfig;
use promptpilot::embedding::{self, EmbeddingProvider};
use promptpilot::memory::{MemoryStore, ProjectMemory};

/// Build the memory store for a command from configuration.
pub fn open_store(config: &PilotConfig) -> Result<MemoryStore> {
    let provider: Arc<dyn EmbeddingProvider> = Arc::from(
        embedding::create_provider(config).context("failed to initialise embedding provider")?,
    );
    tracing::debug!(model = provider.model_name(), "embedding provider selected");
    Ok(MemoryStore::new(config.resolved_store_dir(), provider))
}

/// Open a project for reading without creating it.
///
/// An unknown project is an input error, so a typo does not leave an empty
/// project behind.
pub fn open_existing(store: &MemoryStore, project: &str) -> Result<ProjectMemory> {
    if !store.exists(project)? {
        return Err(promptpilot::Error::InvalidInput(format!(
            "no memory for project '{project}' under {} (see `promptpilot memory list`)",
            store.base_dir().display()
        ))
        .into());
    }
    Ok(store.open(project)?)
}

/// Exit code and hint for a failed command.
///
/// Errors the user can fix map to 2, everything else to 1.
pub fn classify(err: &anyhow::Error) -> (u8, &'static str) {
    match err.downcast_ref::<promptpilot::Error>() {
        Some(e) if e.is_user_error() => (
            2,
            "check your input and configuration (OPENAI_API_KEY, config.toml) and run again",
        ),
        Some(e) if e.is_transient() => (1, "the provider call failed; try again shortly"),
        _ => (1, "try again; run with PROMPTPILOT_LOG_LEVEL=debug for details"),
    }
}

/// Join trailing positional words into one string.
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}
