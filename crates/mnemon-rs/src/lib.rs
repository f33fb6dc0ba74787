//! Public SDK surface for Mnemon.
//!
//! Re-exports the memory building blocks under stable module names and
//! lifts the types most consumers touch (scope, orchestrator, runtime
//! bootstrap) to the crate root, with a small logging helper.

/// Re-export for convenience.
pub use mnemon_rs_config as config;
pub use mnemon_rs_core as core;
/// Re-export for convenience.
pub use mnemon_rs_memory as memory;
/// Re-export for convenience.
pub use mnemon_rs_protocol as protocol;

/// The handful of types a typical embedding application needs.
pub use mnemon_rs_config::MnemonConfig;
pub use mnemon_rs_core::{
    ConversationAugmentor, MemoryOrchestrator, MnemonRuntime, ProviderRegistry, ScopeArgs,
    SearchOutcome, bootstrap,
};
pub use mnemon_rs_protocol::{ChatCompletionRequest, ChatMessage};

#[inline]
/// Initialize env_logger output when the "logging" feature is enabled.
///
/// Without the feature this compiles to nothing; binaries should still
/// call it early in startup so log wiring stays consistent.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
