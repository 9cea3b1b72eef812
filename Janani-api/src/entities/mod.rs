// Public entities for the JANANI API
// This module contains data structures that are shared across the application boundary

// Health score requests and responses
pub mod health_score;

// Common entities for error handling, pagination, etc.
pub mod common;
