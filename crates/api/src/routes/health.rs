use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PubkeyResponse {
    pub_key: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/api/pubkey", get(pubkey))
        .with_state(state)
}

async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

async fn pubkey(State(state): State<AppState>) -> Json<PubkeyResponse> {
    Json(PubkeyResponse {
        pub_key: state.settings.vapid_public_key.clone(),
    })
}
