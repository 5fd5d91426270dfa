use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use notify_core::types::{Subscription, SubscriptionKeys};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{store_error, ApiResult, AppError},
    routes::channels::require_valid_id,
    state::{AppState, RequestId},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{id}/subscribe", post(subscribe))
        .with_state(state)
}

/// The browser's `PushSubscription.toJSON()`; extra fields such as
/// `expirationTime` are ignored.
#[derive(Debug, Deserialize)]
struct PushSubscriptionRequest {
    endpoint: String,
    keys: SubscriptionKeys,
}

async fn subscribe(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    require_valid_id(&id, &request_id)?;

    let payload: PushSubscriptionRequest = serde_json::from_slice(&body).map_err(|err| {
        AppError::BadRequest(format!("invalid push subscription: {err}"))
            .with_request_id(&request_id.0)
    })?;

    if payload.endpoint.trim().is_empty() {
        return Err(
            AppError::BadRequest("push subscription endpoint required".to_string())
                .with_request_id(&request_id.0),
        );
    }

    state
        .relay
        .subscribe(&id, Subscription::new(payload.endpoint, payload.keys))
        .await
        .map_err(store_error(&request_id.0))?;

    Ok(Json(json!({})))
}
