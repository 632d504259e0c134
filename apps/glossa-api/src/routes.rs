use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	routing::{get, post},
};
use serde_json::Value;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new().route("/health", get(health)).route("/api", post(api)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// Single dispatch endpoint. The reply is always a 200 with the
/// `{success, …}` envelope; transport-level failures are the only thing
/// that surfaces as an HTTP error.
async fn api(State(state): State<AppState>, Json(payload): Json<Value>) -> Json<Value> {
	Json(state.dispatch(payload).await)
}
