use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::require_bearer_token;
use crate::handlers;
use crate::state::AppState;

/// Assemble the Evaluation Service's HTTP surface (spec §4.1, §6). Every
/// route sits behind the bearer-auth layer; `axum::serve`'s caller is
/// responsible for passing `with_state`/`into_make_service_with_connect_info`
/// so `/vm/checkin` can read the caller's IP.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submit", post(handlers::submit::submit))
        .route("/vm/checkin", get(handlers::checkin::checkin))
        .route("/vm/update", post(handlers::update::update))
        .route("/info/:hash", get(handlers::info::info))
        .route("/reanalyze/:hash", get(handlers::reanalyze::reanalyze))
        .route("/testauth", get(handlers::testauth::testauth))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token))
        .with_state(state)
}
