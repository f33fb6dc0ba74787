//! Memory record model shared by indexes and stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Session identifier keys written into record metadata at creation.
pub const SCOPE_KEYS: [&str; 3] = ["user_id", "agent_id", "run_id"];

/// Persisted memory record.
///
/// The payload visible to backends is `metadata` plus `text` and
/// `created_at`; the scope fields inside `metadata` are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Embedding of the record's text.
    pub vector: Vec<f32>,
    /// Record content.
    pub text: String,
    /// Scope fields plus caller-supplied metadata.
    pub metadata: Map<String, Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Whether every filter key is present in the metadata with an equal value.
    pub fn matches(&self, filters: &Map<String, Value>) -> bool {
        filters
            .iter()
            .all(|(key, value)| self.metadata.get(key) == Some(value))
    }
}

/// A record with its similarity score, as returned by `search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecord {
    /// The matching record.
    pub record: MemoryRecord,
    /// Similarity to the query vector; higher is nearer.
    pub score: f32,
}

/// A relation triple surfaced by the fact graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphRelation {
    /// Relation source entity.
    pub source: String,
    /// Relation label.
    pub relationship: String,
    /// Relation target entity.
    pub target: String,
}
