pub mod index;
pub mod persist;
pub mod stats;
pub mod store;

pub use stats::MemoryStats;
pub use store::{validate_project_id, MemoryStore, ProjectMemory, Recall};
