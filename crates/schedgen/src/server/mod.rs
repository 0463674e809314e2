use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{generate, saved, sections, status};
use crate::server::middleware::*;
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;
mod util;

pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints require a bearer token
    let saved_router = Router::new()
        .route(
            "/schedule",
            post(saved::post_schedule).delete(saved::delete_schedule),
        )
        .route("/schedules", get(saved::get_schedules))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            auth_validator::require_user,
        ));

    let sections_router = Router::new()
        .route("/", get(sections::get_sections))
        .route("/subject", get(sections::get_by_subject))
        .route("/expanded", get(sections::get_expanded))
        .route(
            "/generate_schedules",
            post(generate::post_generate_schedules),
        )
        .merge(saved_router);

    let catalog_router = Router::new()
        .route("/cache_stats", get(status::get_cache_stats))
        .route(
            "/invalidate_cache",
            post(status::invalidate_cache).layer(mw::from_fn_with_state(
                app_state.clone(),
                auth_validator::require_user,
            )),
        );

    Router::new()
        .route("/health", get(status::get_health))
        .nest("/api/sections", sections_router)
        .nest("/api/catalog", catalog_router)
        .with_state(app_state)
}
