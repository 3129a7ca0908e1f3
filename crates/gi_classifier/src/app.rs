use axum::routing::get;
use axum::Router;

/// Minimal HTTP surface for the Classification Scheduler (spec §6):
/// the scheduler's real work is the polling loop in [`crate::scheduler`],
/// not a request/response API, so this is just a liveness probe for
/// whatever process supervisor manages the fleet.
pub fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "ok"
}
