//! Test helpers shared across Mnemon crates.

pub mod graph;
pub mod llm;
pub mod vector;

pub use graph::{FailingGraphStore, RecordingGraphStore};
pub use llm::{FailingChatProvider, RecordingChatProvider};
pub use vector::{DelayedVectorIndex, FailingVectorIndex};
