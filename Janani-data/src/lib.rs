// JANANI Data
// This crate handles storage of calculated health scores

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
