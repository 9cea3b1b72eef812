use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_health_scores_table(conn)?;
    create_health_scores_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the health scores table.
///
/// Rows are append-only: one row per calculation, never updated in place.
fn create_health_scores_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_scores table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_scores (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            total_score REAL NOT NULL,
            raw_score REAL NOT NULL,
            standard_deviation REAL NOT NULL,
            symptom_score REAL NOT NULL,
            vital_score REAL NOT NULL,
            activity_score REAL NOT NULL,
            nutrition_score REAL NOT NULL,
            pcos_score REAL NOT NULL,
            status TEXT NOT NULL,
            balance_status TEXT NOT NULL,
            equilibrium_factor REAL NOT NULL,
            flower_level TEXT NOT NULL,
            scoring_mode TEXT NOT NULL,
            equilibrium_reached INTEGER,
            iterations INTEGER,
            recommendations TEXT NOT NULL,
            calculated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create index on (user_id, calculated_at) for latest/history lookups
fn create_health_scores_index(conn: &Connection) -> Result<(), String> {
    info!("Creating index on user_id, calculated_at");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_health_scores_user_calculated
        ON health_scores (user_id, calculated_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'health_scores'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
