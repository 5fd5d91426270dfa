use notify_core::config::Settings;
use notify_dispatch::{DispatchConfig, Relay, WebPushTransport};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod error;
mod links;
mod middleware;
mod routes;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env()?;

    let store = notify_db::connect(&settings).await?;
    let transport = WebPushTransport::from_settings(&settings)?;
    let relay = Relay::new(
        store,
        Arc::new(transport),
        DispatchConfig::from_settings(&settings),
    );

    let addr: SocketAddr = settings.api_bind.parse()?;
    let env = settings.notify_env.clone();
    let state = AppState {
        relay,
        settings: Arc::new(settings),
    };

    let app = routes::app(state);

    info!(%addr, %env, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
