use std::env;

use janani_data::database::{self, get_connection_info, initialize_database_pool};
use janani_data::repository::HealthScoreRepository;
use janani_domain::entities::{HealthFactors, ScoringMode};
use janani_domain::health::{check_database_status, get_system_health, SystemStatus};
use janani_domain::services::{HealthScoreService, HealthScoreServiceTrait};
use uuid::Uuid;

// The pool is process-wide, so everything that needs it runs in one test
#[tokio::test]
async fn test_scores_persist_in_sqlite() {
    let db_path = env::temp_dir().join(format!("janani_test_{}.db", Uuid::new_v4()));
    env::set_var("DB_TYPE", "sqlite");
    env::set_var("DB_SQLITE_PATH", db_path.to_string_lossy().to_string());

    initialize_database_pool().expect("pool initializes");
    assert!(database::check_database_health().is_ok());
    assert!(get_connection_info().is_some());

    assert_eq!(check_database_status().await, Ok(true));
    assert_eq!(get_system_health().await.status, SystemStatus::Healthy);

    let service = HealthScoreService::new(HealthScoreRepository::new());
    let factors = HealthFactors::new(8.0, 10.0, 8.0, 8.0, 6.0).unwrap();

    let first = service
        .calculate_and_record("carol", factors, ScoringMode::Weighted)
        .await
        .unwrap();
    let second = service
        .calculate_and_record("carol", factors, ScoringMode::Iterative)
        .await
        .unwrap();

    // A fresh repository has an empty in-memory store, so these reads hit SQLite
    let reader = HealthScoreService::new(HealthScoreRepository::new());

    let latest = reader.get_latest_score("carol").await.unwrap();
    assert_eq!(latest.mode, ScoringMode::Iterative);
    assert_eq!(latest.result, second.result);
    assert_eq!(latest.iterations, second.iterations);

    let (history, total) = reader.get_score_history("carol", Some(10), Some(0)).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(history[1].result, first.result);
    assert_eq!(history[1].factors, factors);

    let (history, total) = reader.get_score_history("dave", None, None).await.unwrap();
    assert_eq!(total, 0);
    assert!(history.is_empty());

    let _ = std::fs::remove_file(&db_path);
}
