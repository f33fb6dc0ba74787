//! JSONL-persisted vector index.
//!
//! Records live in memory for search and are mirrored to a single JSONL
//! file: inserts append, mutations rewrite the file atomically through a
//! temporary sibling.

use crate::error::MemoryError;
use crate::model::{MemoryRecord, ScoredRecord};
use crate::vector::{VectorIndex, rank_records};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RECORDS_FILE: &str = "records.jsonl";

/// Vector index persisted as JSONL under a root directory.
#[derive(Debug)]
pub struct JsonlVectorIndex {
    root: PathBuf,
    records: RwLock<HashMap<Uuid, MemoryRecord>>,
}

impl JsonlVectorIndex {
    /// Open (or create) an index rooted at the given directory, loading
    /// any previously persisted records.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        let records = load_records(&root.join(RECORDS_FILE))?;
        info!(
            "initialized jsonl vector index (root={}, records={})",
            root.display(),
            records.len()
        );
        Ok(Self {
            root,
            records: RwLock::new(records),
        })
    }

    fn records_path(&self) -> PathBuf {
        self.root.join(RECORDS_FILE)
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{RECORDS_FILE}.tmp"))
    }

    /// Rewrite the records file atomically from the in-memory map.
    fn rewrite(&self, records: &HashMap<Uuid, MemoryRecord>) -> Result<(), MemoryError> {
        let path = self.records_path();
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for record in records.values() {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

/// Load all persisted records from a JSONL file.
fn load_records(path: &Path) -> Result<HashMap<Uuid, MemoryRecord>, MemoryError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut records = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: MemoryRecord = serde_json::from_str(&line)?;
        records.insert(record.id, record);
    }
    Ok(records)
}

#[async_trait]
impl VectorIndex for JsonlVectorIndex {
    /// Persist a record by appending to the records file.
    async fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(MemoryError::Backend(format!(
                "duplicate record id: {}",
                record.id
            )));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.records_path())?;
        let line = serde_json::to_string(&record)?;
        writeln!(file, "{line}")?;
        debug!(
            "persisted record (id={}, text_len={})",
            record.id,
            record.text.len()
        );
        records.insert(record.id, record);
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        let records = self.records.read();
        Ok(rank_records(records.values().cloned(), vector, filters, limit))
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn list(&self, filters: &Map<String, Value>) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|record| record.matches(filters))
            .cloned()
            .collect())
    }

    /// Replace a record and rewrite the file atomically.
    async fn update(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if !records.contains_key(&record.id) {
            return Err(MemoryError::NotFound(record.id));
        }
        records.insert(record.id, record);
        self.rewrite(&records)
    }

    async fn delete(&self, id: Uuid) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if records.remove(&id).is_none() {
            return Err(MemoryError::NotFound(id));
        }
        self.rewrite(&records)
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        info!("resetting jsonl vector index (root={})", self.root.display());
        let mut records = self.records.write();
        records.clear();
        let path = self.records_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}
