use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::health_score::{CreateHealthScoreRecord, HealthScoreRecord};
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for health score history
#[async_trait]
pub trait HealthScoreRepositoryTrait {
    /// Insert a new immutable score record
    async fn insert(&self, record: CreateHealthScoreRecord) -> Result<HealthScoreRecord, RepositoryError>;

    /// Get the most recent score record for a user
    async fn get_latest(&self, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError>;

    /// Get a page of a user's score history, newest first, with the total count
    async fn get_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError>;
}

/// Repository for health score history.
/// Uses the SQLite pool when it has been initialized and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct HealthScoreRepository {
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl HealthScoreRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository that shares an existing in-memory store
    pub fn with_storage(storage: InMemoryStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl HealthScoreRepositoryTrait for HealthScoreRepository {
    async fn insert(&self, record: CreateHealthScoreRecord) -> Result<HealthScoreRecord, RepositoryError> {
        if record.user_id.trim().is_empty() {
            return Err(RepositoryError::Validation("user_id must not be empty".to_string()));
        }

        let record = record.into_record(Uuid::new_v4().to_string());

        match get_db_pool() {
            Ok(pool) => {
                debug!("Storing health score in database: {}", record.id);
                match DatabaseStorage::store_record(&pool, &record).await {
                    Ok(_) => Ok(record),
                    Err(e) => {
                        error!("Failed to store health score in database: {}", e);
                        self.storage.store_record(&record).await
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.store_record(&record).await
            }
        }
    }

    async fn get_latest(&self, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError> {
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting latest health score from database");
                match DatabaseStorage::get_latest(&pool, user_id).await {
                    Ok(record) => Ok(record),
                    Err(e) => {
                        error!("Failed to get latest health score from database: {}", e);
                        self.storage.get_latest(user_id).await
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_latest", e);
                self.storage.get_latest(user_id).await
            }
        }
    }

    async fn get_history(
        &self,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError> {
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting health score history from database");
                match DatabaseStorage::get_history(&pool, user_id, limit, offset).await {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        error!("Failed to get health score history from database: {}", e);
                        self.storage.get_history(user_id, limit, offset).await
                    }
                }
            },
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_history", e);
                self.storage.get_history(user_id, limit, offset).await
            }
        }
    }
}

/// Mock health score repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of HealthScoreRepositoryTrait for testing.
    ///
    /// Keeps records in a vector and can be told to fail every call.
    #[derive(Debug, Default)]
    pub struct MockHealthScoreRepository {
        records: Mutex<Vec<HealthScoreRecord>>,
        should_fail: bool,
    }

    impl MockHealthScoreRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<HealthScoreRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                should_fail: false,
            }
        }

        /// Configure the mock to fail every operation
        pub fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                should_fail: true,
            }
        }

        /// Snapshot of the stored records
        pub fn records(&self) -> Vec<HealthScoreRecord> {
            self.records.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.should_fail {
                Err(RepositoryError::MutexLock("mock repository configured to fail".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl HealthScoreRepositoryTrait for MockHealthScoreRepository {
        async fn insert(&self, record: CreateHealthScoreRecord) -> Result<HealthScoreRecord, RepositoryError> {
            self.check()?;
            let record = record.into_record(Uuid::new_v4().to_string());
            self.records.lock()?.push(record.clone());
            Ok(record)
        }

        async fn get_latest(&self, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError> {
            self.check()?;
            let latest = self.records.lock()?
                .iter()
                .filter(|r| r.user_id == user_id)
                .max_by(|a, b| a.calculated_at.cmp(&b.calculated_at))
                .cloned();
            Ok(latest)
        }

        async fn get_history(
            &self,
            user_id: &str,
            limit: Option<usize>,
            offset: Option<usize>,
        ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError> {
            self.check()?;
            let mut filtered: Vec<HealthScoreRecord> = self.records.lock()?
                .iter()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            filtered.sort_by(|a, b| b.calculated_at.cmp(&a.calculated_at));

            let total = filtered.len();
            let page = filtered
                .into_iter()
                .skip(offset.unwrap_or(0))
                .take(limit.unwrap_or(usize::MAX))
                .collect();

            Ok((page, total))
        }
    }
}
