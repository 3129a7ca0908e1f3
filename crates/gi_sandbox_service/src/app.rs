use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::require_bearer_token;
use crate::handlers;
use crate::state::AppState;

/// Assemble the Sandbox Service's HTTP surface (spec §4.2, §6).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submit/sample", post(handlers::submit_sample::submit_sample))
        .route("/submit/analysis/:hash", post(handlers::submit_analysis::submit_analysis))
        .route("/vm/checkin", get(handlers::checkin::checkin))
        .route("/vm/submit/report", post(handlers::submit_report::submit_report))
        .route("/vm/submit/error", post(handlers::submit_error::submit_error))
        .route("/testauth", get(handlers::testauth::testauth))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token))
        .with_state(state)
}
