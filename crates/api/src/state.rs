use notify_core::config::Settings;
use notify_dispatch::Relay;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub settings: Arc<Settings>,
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);
