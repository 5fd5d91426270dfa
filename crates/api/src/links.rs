use axum::http::HeaderMap;
use notify_core::config::Settings;
use notify_core::types::RegistrantMeta;
use std::net::SocketAddr;

/// Public URLs for a channel. Each base comes from settings when
/// configured and from the incoming request otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    web_base: String,
    api_base: String,
}

impl Links {
    pub fn new(settings: &Settings, headers: &HeaderMap) -> Self {
        let request_base = request_base(headers);
        Self {
            web_base: settings
                .web_server
                .clone()
                .unwrap_or_else(|| request_base.clone()),
            api_base: settings.api_server.clone().unwrap_or(request_base),
        }
    }

    pub fn channel_page(&self, channel_id: &str) -> String {
        format!("{}/c/{}", self.web_base, channel_id)
    }

    pub fn endpoint(&self, channel_id: &str) -> String {
        format!("{}/{}", self.api_base, channel_id)
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn request_base(headers: &HeaderMap) -> String {
    let proto = header(headers, "x-forwarded-proto")
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .unwrap_or("http");
    let host = header(headers, "x-forwarded-host")
        .or_else(|| header(headers, "host"))
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}

/// The registrant's address prefers the first `X-Forwarded-For` hop over
/// the socket peer.
pub fn registrant_meta(headers: &HeaderMap, peer: Option<SocketAddr>) -> RegistrantMeta {
    let ip = header(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .or_else(|| peer.map(|addr| addr.ip().to_string()));

    RegistrantMeta {
        ip,
        agent: header(headers, "user-agent").map(str::to_string),
    }
}
