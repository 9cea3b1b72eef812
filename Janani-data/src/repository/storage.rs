use rusqlite::{params, Connection, Row};
use tracing::debug;

use crate::models::health_score::HealthScoreRecord;
use crate::database::DatabasePool;
use super::errors::RepositoryError;

const SELECT_COLUMNS: &str = "id, user_id, total_score, raw_score, standard_deviation,
    symptom_score, vital_score, activity_score, nutrition_score, pcos_score,
    status, balance_status, equilibrium_factor, flower_level, scoring_mode,
    equilibrium_reached, iterations, recommendations, calculated_at";

/// Database storage operations for health score records
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a record in the database
    pub async fn store_record(pool: &DatabasePool, record: &HealthScoreRecord) -> Result<(), RepositoryError> {
        debug!("Storing health score in database: id={}", record.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                Self::insert(&conn, record)
            },
        }
    }

    /// Get the latest record for a user from the database
    pub async fn get_latest(pool: &DatabasePool, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError> {
        debug!("Getting latest health score from database for user {}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                Self::latest(&conn, user_id)
            },
        }
    }

    /// Get a page of a user's history from the database, newest first
    pub async fn get_history(
        pool: &DatabasePool,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError> {
        debug!("Getting health score history from database for user {}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                Self::history(&conn, user_id, limit, offset)
            },
        }
    }

    pub(crate) fn insert(conn: &Connection, record: &HealthScoreRecord) -> Result<(), RepositoryError> {
        let recommendations = serde_json::to_string(&record.recommendations)?;

        conn.execute(
            "INSERT INTO health_scores
             (id, user_id, total_score, raw_score, standard_deviation,
              symptom_score, vital_score, activity_score, nutrition_score, pcos_score,
              status, balance_status, equilibrium_factor, flower_level, scoring_mode,
              equilibrium_reached, iterations, recommendations, calculated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                record.id,
                record.user_id,
                record.total_score,
                record.raw_score,
                record.standard_deviation,
                record.symptom_score,
                record.vital_score,
                record.activity_score,
                record.nutrition_score,
                record.pcos_score,
                record.status,
                record.balance_status,
                record.equilibrium_factor,
                record.flower_level,
                record.scoring_mode,
                record.equilibrium_reached,
                record.iterations,
                recommendations,
                record.calculated_at,
            ],
        )?;

        Ok(())
    }

    pub(crate) fn latest(conn: &Connection, user_id: &str) -> Result<Option<HealthScoreRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM health_scores WHERE user_id = ?1
             ORDER BY calculated_at DESC, rowid DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id])?;

        match rows.next()? {
            Some(row) => Ok(Some(Self::map_row(row)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn history(
        conn: &Connection,
        user_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<HealthScoreRecord>, usize), RepositoryError> {
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM health_scores WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        // SQLite treats a negative LIMIT as unbounded and a negative OFFSET as 0,
        // so oversized values saturate instead of wrapping
        let limit = limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX)).unwrap_or(-1);
        let offset = i64::try_from(offset.unwrap_or(0)).unwrap_or(i64::MAX);

        let sql = format!(
            "SELECT {} FROM health_scores WHERE user_id = ?1
             ORDER BY calculated_at DESC, rowid DESC LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id, limit, offset])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::map_row(row)?);
        }

        Ok((records, total as usize))
    }

    fn map_row(row: &Row<'_>) -> Result<HealthScoreRecord, RepositoryError> {
        let recommendations: String = row.get(17)?;

        Ok(HealthScoreRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            total_score: row.get(2)?,
            raw_score: row.get(3)?,
            standard_deviation: row.get(4)?,
            symptom_score: row.get(5)?,
            vital_score: row.get(6)?,
            activity_score: row.get(7)?,
            nutrition_score: row.get(8)?,
            pcos_score: row.get(9)?,
            status: row.get(10)?,
            balance_status: row.get(11)?,
            equilibrium_factor: row.get(12)?,
            flower_level: row.get(13)?,
            scoring_mode: row.get(14)?,
            equilibrium_reached: row.get(15)?,
            iterations: row.get(16)?,
            recommendations: serde_json::from_str(&recommendations)?,
            calculated_at: row.get(18)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::run_sqlite_migrations;
    use crate::models::health_score::CreateHealthScoreRecord;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_sqlite_migrations(&conn).unwrap();
        conn
    }

    fn record(id: &str, user_id: &str, calculated_at: &str) -> HealthScoreRecord {
        CreateHealthScoreRecord {
            user_id: user_id.to_string(),
            total_score: 6.6,
            raw_score: 7.6,
            standard_deviation: 3.2,
            symptom_score: 2.0,
            vital_score: 10.0,
            activity_score: 10.0,
            nutrition_score: 10.0,
            pcos_score: 10.0,
            status: "Caution".to_string(),
            balance_status: "Imbalanced".to_string(),
            equilibrium_factor: 0.0,
            flower_level: "Sprout".to_string(),
            scoring_mode: "iterative".to_string(),
            equilibrium_reached: Some(true),
            iterations: Some(12),
            recommendations: vec!["Focus on improving symptoms to restore balance".to_string()],
            calculated_at: calculated_at.to_string(),
        }
        .into_record(id.to_string())
    }

    #[test]
    fn test_insert_and_read_back() {
        let conn = connection();
        let stored = record("a", "alice", "2024-05-01T08:00:00+00:00");
        DatabaseStorage::insert(&conn, &stored).unwrap();

        let latest = DatabaseStorage::latest(&conn, "alice").unwrap().unwrap();
        assert_eq!(latest, stored);
    }

    #[test]
    fn test_history_is_newest_first_and_paginated() {
        let conn = connection();
        DatabaseStorage::insert(&conn, &record("a", "alice", "2024-05-01T08:00:00+00:00")).unwrap();
        DatabaseStorage::insert(&conn, &record("b", "alice", "2024-05-03T08:00:00+00:00")).unwrap();
        DatabaseStorage::insert(&conn, &record("c", "alice", "2024-05-02T08:00:00+00:00")).unwrap();
        DatabaseStorage::insert(&conn, &record("d", "bob", "2024-05-04T08:00:00+00:00")).unwrap();

        let (all, total) = DatabaseStorage::history(&conn, "alice", None, None).unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let (page, total) = DatabaseStorage::history(&conn, "alice", Some(1), Some(1)).unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "c");
    }

    #[test]
    fn test_history_offset_past_i64_range_is_empty() {
        let conn = connection();
        DatabaseStorage::insert(&conn, &record("a", "alice", "2024-05-01T08:00:00+00:00")).unwrap();

        let (page, total) = DatabaseStorage::history(&conn, "alice", Some(20), Some(usize::MAX)).unwrap();
        assert_eq!(total, 1);
        assert!(page.is_empty());

        let (page, _) = DatabaseStorage::history(&conn, "alice", Some(usize::MAX), None).unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let conn = connection();
        let stored = record("a", "alice", "2024-05-01T08:00:00+00:00");
        DatabaseStorage::insert(&conn, &stored).unwrap();
        assert!(DatabaseStorage::insert(&conn, &stored).is_err());
    }
}
