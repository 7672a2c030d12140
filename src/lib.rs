//! Per-project vector memory for question-answering agents.
//!
//! PromptPilot keeps a small long-term memory for each project: texts are
//! embedded, stored in a flat L2 similarity index, and persisted next to the
//! raw texts so the memory survives restarts. Recalled passages can be handed
//! to a language model to ground its answers.
//!
//! # Architecture
//!
//! - **Embeddings**: OpenAI-compatible `/embeddings` endpoint, or a
//!   deterministic offline bag-of-words provider
//! - **Index**: exact nearest-neighbour search via [hora](https://github.com/hora-search/hora)
//! - **Storage**: one directory per project holding `index.hora` and `text_data.json`
//! - **Answers**: chat-completion model prompted with recalled context
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`embedding`] — Text-to-vector providers
//! - [`memory`] — Per-project store: open, add, search, delete, stats
//! - [`llm`] — Language model trait with remote and static implementations
//! - [`answer`] — Prompt assembly and answer extraction
//! - [`error`] — Error taxonomy shared by all of the above

pub mod answer;
pub mod config;
pub mod embedding;
pub mod error;
mod http;
pub mod llm;
pub mod memory;

pub use error::{Error, Result};
