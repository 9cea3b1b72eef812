pub mod health_score;
