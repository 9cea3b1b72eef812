use std::sync::{Arc, Mutex};

use crate::models::health_score::HealthScoreRecord;
use super::errors::RepositoryError;

/// In-memory storage for health score records.
///
/// Clones share the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    /// Records in insertion order
    records: Arc<Mutex<Vec<HealthScoreRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record in memory
    pub async fn store_record(&self, record: &HealthScoreRecord) -> Result<HealthScoreRecord, RepositoryError> {
        let mut store = self.records.lock()?;
        store.push(record.clone());
        Ok(record.clone())
    }

    /// Get the most recent record for a user.
    ///
    /// Ties on `calculated_at` resolve to the record inserted last.
    pub async fn get_latest(&self, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError> {
        let store = self.records.lock()?;

        // max_by keeps the last maximum, i.e. the most recently inserted
        let latest = store.iter()
            .filter(|record| record.user_id == user_id)
            .max_by(|a, b| a.calculated_at.cmp(&b.calculated_at))
            .cloned();

        Ok(latest)
    }

    /// Get a page of a user's history, newest first, with the total count
    pub async fn get_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError> {
        let store = self.records.lock()?;

        let mut records: Vec<HealthScoreRecord> = store.iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal timestamps; reverse for newest first
        records.sort_by(|a, b| a.calculated_at.cmp(&b.calculated_at));
        records.reverse();

        let total = records.len();
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(total);

        let page = records
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Ok((page, total))
    }

    /// Number of stored records across all users
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock()?.len())
    }

    /// Whether the storage holds no records
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}
