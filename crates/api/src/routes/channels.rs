use axum::{
    extract::{ConnectInfo, Path, Request, State},
    http::HeaderMap,
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use notify_core::types::{DeliveryResult, Message, MessageData};
use notify_core::ChannelRegistry;
use serde::Serialize;
use std::net::SocketAddr;

use crate::{
    error::{store_error, ApiResult},
    links::{registrant_meta, Links},
    routes::messages::post_message,
    state::{AppState, RequestId},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/register_channel", post(register_channel))
        .route("/{id}", get(redirect_channel).post(post_message))
        .route("/{id}/info", get(channel_info))
        .route("/{id}/json", get(channel_json))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct RegisterChannelResponse {
    #[serde(rename = "channelId")]
    channel_id: String,
    #[serde(rename = "pubKey")]
    pub_key: String,
    messages: Vec<MessageResponse>,
    channel_page: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ChannelInfoResponse {
    channel_page: String,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct ChannelJsonResponse {
    messages: Vec<MessageResponse>,
    #[serde(rename = "channelId")]
    channel_id: String,
    #[serde(rename = "pubKey")]
    pub_key: String,
    subscriptions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    id: i64,
    message: String,
    time: DateTime<Utc>,
    data: MessageData,
    result: DeliveryResult,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        MessageResponse {
            id: message.id,
            message: message.content,
            time: message.created_at,
            data: message.data,
            result: message.delivery_result,
        }
    }
}

/// Reject a malformed id with the same 404 an unknown channel gets.
pub fn require_valid_id(channel_id: &str, request_id: &RequestId) -> ApiResult<()> {
    ChannelRegistry::check_id(channel_id).map_err(store_error(&request_id.0))
}

async fn register_channel(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    request: Request,
) -> ApiResult<Json<RegisterChannelResponse>> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let meta = registrant_meta(request.headers(), peer);

    let channel_id = state
        .relay
        .register(meta)
        .await
        .map_err(store_error(&request_id.0))?;

    let links = Links::new(&state.settings, request.headers());
    Ok(Json(RegisterChannelResponse {
        channel_page: links.channel_page(&channel_id),
        endpoint: links.endpoint(&channel_id),
        pub_key: state.settings.vapid_public_key.clone(),
        messages: Vec::new(),
        channel_id,
    }))
}

async fn redirect_channel(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Redirect> {
    require_valid_id(&id, &request_id)?;
    let links = Links::new(&state.settings, &headers);
    Ok(Redirect::to(&links.channel_page(&id)))
}

async fn channel_info(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<ChannelInfoResponse>> {
    state
        .relay
        .channel(&id)
        .await
        .map_err(store_error(&request_id.0))?;

    let links = Links::new(&state.settings, &headers);
    Ok(Json(ChannelInfoResponse {
        channel_page: links.channel_page(&id),
        endpoint: links.endpoint(&id),
    }))
}

async fn channel_json(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChannelJsonResponse>> {
    let view = state
        .relay
        .read(&id)
        .await
        .map_err(store_error(&request_id.0))?;

    Ok(Json(ChannelJsonResponse {
        subscriptions: view.channel.subscription_ids(),
        messages: view.messages.into_iter().map(MessageResponse::from).collect(),
        pub_key: state.settings.vapid_public_key.clone(),
        channel_id: view.channel.id,
    }))
}
