//! Connection log
//!
//! Append-only history of evaluated connections. Records are never updated
//! or deleted; deleting a policy leaves the records that reference it
//! untouched.

use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::connection::EvaluationRecord;

#[derive(Default)]
pub struct ConnectionLog {
    records: RwLock<HashMap<Uuid, EvaluationRecord>>,
}

impl ConnectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one evaluation record. Identifiers are generated fresh per
    /// evaluation, so an existing entry is never overwritten.
    pub fn append(&self, record: EvaluationRecord) {
        let mut records = self.records.write();
        debug_assert!(!records.contains_key(&record.connection_id));
        tracing::debug!(
            "Recorded connection {}: decision={}",
            record.connection_id,
            record.decision
        );
        records.insert(record.connection_id, record);
    }

    pub fn get(&self, connection_id: Uuid) -> Option<EvaluationRecord> {
        self.records.read().get(&connection_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
