use axum::{routing::get, Router};

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/",
            get(handlers::service_info).post(handlers::generate_report::<S>),
        )
        .route("/health", get(handlers::health_check::<S>))
        .route("/test-database", get(handlers::test_database::<S>))
}
