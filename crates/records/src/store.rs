//! Record persistence
//!
//! Records are stored as plain JSON objects keyed by an auto-incrementing
//! `id`; the store enforces nothing beyond that key. Field meaning is applied
//! on the way out by [`composer::Record::from_value`].

use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors reported by a store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Record has no id")]
    MissingId,

    #[error("Record is not an object")]
    NotAnObject,
}

/// Key-value record storage
pub trait RecordStore {
    /// Insert a record and return its newly assigned id
    fn add(&mut self, record: Value) -> Result<u64, StoreError>;

    /// Insert or overwrite the record under its `id`
    fn put(&mut self, record: Value) -> Result<u64, StoreError>;

    /// Every record in key order
    fn get_all(&self) -> Result<Vec<Value>, StoreError>;

    /// Remove a record; missing ids are not an error
    fn delete(&mut self, id: u64) -> Result<(), StoreError>;
}

/// Store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<u64, Value>,
    last_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn add(&mut self, mut record: Value) -> Result<u64, StoreError> {
        let map = record.as_object_mut().ok_or(StoreError::NotAnObject)?;
        self.last_id += 1;
        let id = self.last_id;
        map.insert("id".to_string(), json!(id));
        self.records.insert(id, record);
        Ok(id)
    }

    fn put(&mut self, record: Value) -> Result<u64, StoreError> {
        if !record.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .ok_or(StoreError::MissingId)?;
        self.last_id = self.last_id.max(id);
        self.records.insert(id, record);
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<Value>, StoreError> {
        Ok(self.records.values().cloned().collect())
    }

    fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        self.records.remove(&id);
        Ok(())
    }
}
