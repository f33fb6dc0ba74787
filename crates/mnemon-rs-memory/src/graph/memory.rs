//! In-process graph store for tests and small deployments.
//!
//! No extraction is attempted: each added text becomes a single `mentions`
//! relation from the first scope identifier to the text itself.

use crate::error::MemoryError;
use crate::graph::GraphStore;
use crate::model::{GraphRelation, SCOPE_KEYS};
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};

/// One stored relation together with the filters active when it was added.
#[derive(Debug, Clone)]
struct StoredRelation {
    scope: Map<String, Value>,
    relation: GraphRelation,
}

/// Reference graph store holding relations in memory.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    relations: RwLock<Vec<StoredRelation>>,
}

impl InMemoryGraphStore {
    /// Create an empty graph store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored relations.
    pub fn len(&self) -> usize {
        self.relations.read().len()
    }

    /// Whether the store holds no relations.
    pub fn is_empty(&self) -> bool {
        self.relations.read().is_empty()
    }
}

/// Whether every filter key matches the stored scope.
fn scope_matches(scope: &Map<String, Value>, filters: &Map<String, Value>) -> bool {
    filters
        .iter()
        .all(|(key, value)| scope.get(key) == Some(value))
}

/// First scope identifier value present in the filters.
fn source_entity(filters: &Map<String, Value>) -> String {
    SCOPE_KEYS
        .iter()
        .find_map(|key| filters.get(*key).and_then(Value::as_str))
        .unwrap_or("session")
        .to_string()
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn add(&self, text: &str, filters: &Map<String, Value>) -> Result<(), MemoryError> {
        let relation = GraphRelation {
            source: source_entity(filters),
            relationship: "mentions".to_string(),
            target: text.to_string(),
        };
        debug!(
            "graph add (source={}, target_len={})",
            relation.source,
            relation.target.len()
        );
        self.relations.write().push(StoredRelation {
            scope: filters.clone(),
            relation,
        });
        Ok(())
    }

    /// Return relations whose target shares a token with the query.
    async fn search(
        &self,
        query: &str,
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        let query_tokens: Vec<String> = query
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .map(|token| token.to_lowercase())
            .collect();
        let relations = self.relations.read();
        let mut hits = Vec::new();
        for stored in relations.iter() {
            if !scope_matches(&stored.scope, filters) {
                continue;
            }
            let target = stored.relation.target.to_lowercase();
            if query_tokens.iter().any(|token| target.contains(token)) {
                hits.push(stored.relation.clone());
            }
            if hits.len() == limit {
                break;
            }
        }
        Ok(hits)
    }

    async fn get_all(
        &self,
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        Ok(self
            .relations
            .read()
            .iter()
            .filter(|stored| scope_matches(&stored.scope, filters))
            .take(limit)
            .map(|stored| stored.relation.clone())
            .collect())
    }

    async fn delete_all(&self, filters: &Map<String, Value>) -> Result<(), MemoryError> {
        self.relations
            .write()
            .retain(|stored| !scope_matches(&stored.scope, filters));
        Ok(())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        self.relations.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryGraphStore;
    use crate::graph::GraphStore;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn filters(user_id: &str) -> Map<String, serde_json::Value> {
        let mut map = Map::new();
        map.insert("user_id".to_string(), json!(user_id));
        map
    }

    #[tokio::test]
    async fn search_returns_scope_matched_relations() {
        let graph = InMemoryGraphStore::new();
        graph
            .add("blue is my favorite color", &filters("u1"))
            .await
            .expect("add");
        graph
            .add("the sky is blue", &filters("u2"))
            .await
            .expect("add");

        let hits = graph
            .search("favorite color?", &filters("u1"), 10)
            .await
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, "u1");
        assert_eq!(hits[0].relationship, "mentions");
    }

    #[tokio::test]
    async fn delete_all_is_scope_limited() {
        let graph = InMemoryGraphStore::new();
        graph.add("fact one", &filters("u1")).await.expect("add");
        graph.add("fact two", &filters("u2")).await.expect("add");

        graph.delete_all(&filters("u1")).await.expect("delete_all");
        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.get_all(&filters("u2"), 10).await.expect("get_all").len(),
            1
        );
    }

    #[tokio::test]
    async fn reset_clears_every_scope() {
        let graph = InMemoryGraphStore::new();
        graph.add("fact one", &filters("u1")).await.expect("add");
        graph.add("fact two", &filters("u2")).await.expect("add");

        graph.reset().await.expect("reset");
        assert!(graph.is_empty());
    }
}
