use axum::http::StatusCode;

/// `GET /testauth` (SPEC_FULL §8 supplement): reachable only past the
/// bearer-auth layer, so `200` confirms a caller's token.
pub async fn testauth() -> StatusCode {
    StatusCode::OK
}
