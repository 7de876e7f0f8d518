//! Liveness endpoint.

/// `GET /` — plain-text liveness check.
pub async fn live() -> &'static str {
    "ECG backend working properly"
}
