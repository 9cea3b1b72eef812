pub mod handlers;
pub mod routes;

#[cfg(test)]
mod routes_tests;

use axum::Router;

/// Create the application router
pub async fn create_application() -> Router {
    routes::create_app().await
}
