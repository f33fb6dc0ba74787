//! Session scope resolution.
//!
//! Turns raw caller identifiers into the metadata template attached to new
//! records and the filter set used for retrieval. Pure and deterministic;
//! caller maps are cloned so later mutation cannot alias into a call.

use crate::error::CoreError;
use serde_json::{Map, Value, json};

/// Raw identifiers and extras supplied with a memory operation.
#[derive(Debug, Clone, Default)]
pub struct ScopeArgs {
    /// User identifier, for session scoping.
    pub user_id: Option<String>,
    /// Agent identifier, for session scoping.
    pub agent_id: Option<String>,
    /// Run identifier, for session scoping.
    pub run_id: Option<String>,
    /// Actor identifier, used only to narrow retrieval.
    pub actor_id: Option<String>,
    /// Extra metadata attached to records created in this call.
    pub metadata: Option<Map<String, Value>>,
    /// Extra filters applied to retrieval in this call.
    pub filters: Option<Map<String, Value>>,
}

/// Resolved storage template and query filters for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope {
    /// Metadata template for records created in this call.
    pub metadata: Map<String, Value>,
    /// Filters scoping retrieval in this call.
    pub filters: Map<String, Value>,
}

impl ScopeArgs {
    /// Scope for a single user session.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Scope for a single run.
    pub fn for_run(run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            ..Self::default()
        }
    }

    /// Whether any session identifier is present.
    pub fn has_session_id(&self) -> bool {
        self.user_id.is_some() || self.agent_id.is_some() || self.run_id.is_some()
    }

    /// Build the metadata template and query filters for this call.
    ///
    /// Every provided session identifier is written into both maps under
    /// its own key. The actor identifier resolves with precedence explicit
    /// argument over a pre-existing `actor_id` filter entry, and lands only
    /// in the filters: the actor recorded at storage time is derived from
    /// content, not from the caller's query-time hint.
    pub fn resolve(&self) -> Result<ResolvedScope, CoreError> {
        let mut metadata = self.metadata.clone().unwrap_or_default();
        let mut filters = self.filters.clone().unwrap_or_default();

        if !self.has_session_id() {
            return Err(CoreError::MissingScope);
        }

        let session_ids = [
            ("user_id", &self.user_id),
            ("agent_id", &self.agent_id),
            ("run_id", &self.run_id),
        ];
        for (key, value) in session_ids {
            if let Some(value) = value {
                metadata.insert(key.to_string(), json!(value));
                filters.insert(key.to_string(), json!(value));
            }
        }

        if let Some(actor_id) = &self.actor_id {
            filters.insert("actor_id".to_string(), json!(actor_id));
        }

        Ok(ResolvedScope { metadata, filters })
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeArgs;
    use crate::error::CoreError;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    #[test]
    fn resolve_without_any_session_id_is_rejected() {
        let args = ScopeArgs {
            actor_id: Some("a1".to_string()),
            ..ScopeArgs::default()
        };
        let err = args.resolve().expect_err("no scope");
        assert!(matches!(err, CoreError::MissingScope));
    }

    #[test]
    fn resolve_writes_each_provided_id_into_both_maps() {
        let args = ScopeArgs {
            user_id: Some("u1".to_string()),
            run_id: Some("r1".to_string()),
            ..ScopeArgs::default()
        };
        let resolved = args.resolve().expect("resolve");

        assert_eq!(resolved.metadata.get("user_id"), Some(&json!("u1")));
        assert_eq!(resolved.metadata.get("run_id"), Some(&json!("r1")));
        assert_eq!(resolved.metadata.get("agent_id"), None);
        assert_eq!(resolved.filters.get("user_id"), Some(&json!("u1")));
        assert_eq!(resolved.filters.get("run_id"), Some(&json!("r1")));
        assert_eq!(resolved.filters.get("agent_id"), None);
    }

    #[test]
    fn explicit_actor_argument_beats_filter_entry() {
        let mut filters = Map::new();
        filters.insert("actor_id".to_string(), json!("B"));
        let args = ScopeArgs {
            user_id: Some("u1".to_string()),
            actor_id: Some("A".to_string()),
            filters: Some(filters),
            ..ScopeArgs::default()
        };
        let resolved = args.resolve().expect("resolve");

        assert_eq!(resolved.filters.get("actor_id"), Some(&json!("A")));
        assert_eq!(resolved.metadata.get("actor_id"), None);
    }

    #[test]
    fn filter_actor_entry_survives_when_no_argument_is_given() {
        let mut filters = Map::new();
        filters.insert("actor_id".to_string(), json!("B"));
        let args = ScopeArgs {
            user_id: Some("u1".to_string()),
            filters: Some(filters),
            ..ScopeArgs::default()
        };
        let resolved = args.resolve().expect("resolve");
        assert_eq!(resolved.filters.get("actor_id"), Some(&json!("B")));
    }

    #[test]
    fn caller_maps_are_copied_not_aliased() {
        let mut metadata = Map::new();
        metadata.insert("topic".to_string(), json!("colors"));
        let args = ScopeArgs {
            user_id: Some("u1".to_string()),
            metadata: Some(metadata.clone()),
            ..ScopeArgs::default()
        };

        let first = args.resolve().expect("resolve");
        let second = args.resolve().expect("resolve");
        assert_eq!(first, second);

        // The resolved maps carry the extras plus the scope key only.
        assert_eq!(first.metadata.len(), 2);
        assert_eq!(first.metadata.get("topic"), Some(&json!("colors")));
        // The caller's map is untouched by resolution.
        assert_eq!(metadata.len(), 1);
    }
}
