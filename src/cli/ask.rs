//! CLI `ask` command — answer a question, optionally grounded in a project's memory.

use std::sync::Arc;

use anyhow::{Context, Result};
use promptpilot::answer::SmartAnswer;
use promptpilot::config::PilotConfig;
use promptpilot::llm::{self, LanguageModel};

/// Answer `question`, recalling up to `k` passages from `project` first if given.
pub fn ask(config: &PilotConfig, question: &str, project: Option<&str>, k: usize) -> Result<()> {
    let context = match project {
        Some(project) => {
            let store = super::open_store(config)?;
            let memory = super::open_existing(&store, project)?;
            let recalled = memory.search(question, k)?;
            tracing::info!(project, recalled = recalled.len(), "context recalled");
            recalled
        }
        None => Vec::new(),
    };

    let model: Arc<dyn LanguageModel> =
        Arc::from(llm::create_model(config).context("failed to initialise language model")?);
    let answer = SmartAnswer::new(model).answer(question, &context)?;

    println!("{answer}");
    Ok(())
}
