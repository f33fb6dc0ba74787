//! Core memory orchestration for Mnemon.
//!
//! This crate owns scope resolution, the memory orchestrator, the
//! background write queue, and the conversation augmentor used by the
//! server and SDK.

pub mod augment;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod registry;
pub mod scope;
pub mod writer;

pub use augment::{ConversationAugmentor, DEFAULT_SYSTEM_PROMPT};
pub use error::CoreError;
/// Chat capability and the bundled OpenAI-compatible client.
pub use llm::{ChatProvider, ChunkStream, OpenAiChatProvider};
pub use orchestrator::{AddedMemory, MemoryOrchestrator, SearchOutcome};
/// Provider wiring and runtime bootstrap.
pub use registry::{MnemonRuntime, ProviderRegistry, bootstrap};
pub use scope::{ResolvedScope, ScopeArgs};
pub use writer::{MemoryWriter, WriteJob};
