use axum::http::StatusCode;

/// `GET /testauth` (SPEC_FULL §8 supplement, ported from the original's
/// health-check route): reachable only past the bearer-auth layer, so a
/// `200` confirms a caller's token without mutating anything.
pub async fn testauth() -> StatusCode {
    StatusCode::OK
}
