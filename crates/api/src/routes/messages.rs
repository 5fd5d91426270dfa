use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use notify_core::types::PresentationOptions;
use notify_dispatch::OutgoingMessage;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::{
    error::{store_error, ApiResult},
    links::Links,
    routes::channels::require_valid_id,
    state::{AppState, RequestId},
};

/// `POST /{id}`: the body is either raw text or a form with `message`,
/// `action`, `vibrate` and `silent` fields.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<Json<Value>> {
    require_valid_id(&id, &request_id)?;

    let message = parse_message_body(&body);

    let page_url = Links::new(&state.settings, &headers).channel_page(&id);
    state
        .relay
        .post(&id, message, &page_url)
        .await
        .map_err(store_error(&request_id.0))?;

    Ok(Json(json!({})))
}

pub fn parse_message_body(body: &str) -> OutgoingMessage {
    let mut fields: HashMap<String, String> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let content = match fields.remove("message") {
        Some(message) => message,
        None => body.to_string(),
    };

    let presentation = PresentationOptions {
        vibrate: flag(fields.get("vibrate"))
            .then(|| PresentationOptions::DEFAULT_VIBRATION.to_vec()),
        silent: flag(fields.get("silent")),
    };

    OutgoingMessage {
        content,
        action: fields.remove("action").filter(|action| !action.is_empty()),
        presentation,
    }
}

/// Present counts as set unless the value spells out "off".
fn flag(value: Option<&String>) -> bool {
    match value {
        None => false,
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
    }
}
