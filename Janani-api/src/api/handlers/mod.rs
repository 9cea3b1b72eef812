pub mod health;
pub mod health_score;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use health_score::{
    calculate_health_score, derive_health_factors, get_health_score_history,
    get_latest_health_score,
};
pub use health::health_check;
