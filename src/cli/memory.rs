//! CLI `memory` commands.

use anyhow::{bail, Result};
use std::io::Write;

use promptpilot::config::PilotConfig;

pub fn add(config: &PilotConfig, project: &str, text: &str) -> Result<()> {
    let mut memory = super::open_store(config)?.open(project)?;
    memory.add(text)?;
    println!("Stored in '{}' ({} entries).", project, memory.len());
    Ok(())
}

pub fn search(config: &PilotConfig, project: &str, query: &str, k: usize) -> Result<()> {
    let memory = super::open_existing(&super::open_store(config)?, project)?;
    let hits = memory.search_scored(query, k)?;

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        println!("  {}. [#{}] distance: {:.4}", i + 1, hit.id, hit.distance);
        println!("     {}", preview(&hit.text, 120));
        println!();
    }
    Ok(())
}

/// Delete a project's memory, asking for confirmation unless `assume_yes`.
pub fn delete(config: &PilotConfig, project: &str, assume_yes: bool) -> Result<()> {
    let mut memory = super::open_store(config)?.open(project)?;

    if !assume_yes {
        println!(
            "WARNING: This will permanently delete {} memories of project '{}'.",
            memory.len(),
            project
        );
        println!("Directory: {}", memory.path().display());
        print!("\nType YES to confirm: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if input.trim() != "YES" {
            bail!("delete cancelled");
        }
    }

    memory.delete();
    println!("Memory of '{project}' deleted.");
    Ok(())
}

pub fn stats(config: &PilotConfig, project: &str) -> Result<()> {
    let stats = super::open_existing(&super::open_store(config)?, project)?.stats();

    println!("Memory Statistics");
    println!("{}", "=".repeat(40));
    println!("  Project:             {}", stats.project_id);
    println!("  Entries:             {}", stats.entries);
    println!("  Dimension:           {}", stats.dimension);
    println!("  Index size:          {} bytes", stats.index_bytes);
    println!("  Corpus size:         {} bytes", stats.corpus_bytes);
    println!("  Directory:           {}", stats.path.display());
    Ok(())
}

pub fn list(config: &PilotConfig) -> Result<()> {
    let store = super::open_store(config)?;
    let projects = store.list_projects()?;

    if projects.is_empty() {
        println!("No projects under {}.", store.base_dir().display());
        return Ok(());
    }
    for project in projects {
        println!("{project}");
    }
    Ok(())
}

/// First `max` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 2), "éé...");
    }
}
