use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

mod accommodations;
mod app;
mod auth;
mod bookings;
mod config;
mod error;
mod notifications;
mod pagination;
mod payments;
mod state;
mod users;

use crate::config::AppConfig;
use crate::notifications::{telegram::TelegramClient, ChatClient};
use crate::payments::stripe::{CheckoutProvider, StripeCheckout};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "stayhub=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let (notifier, rx) = notifications::channel(256);
    let chat: Arc<dyn ChatClient> = Arc::new(TelegramClient::new(&config.telegram));
    tokio::spawn(notifications::run_dispatcher(rx, chat));

    let checkout: Arc<dyn CheckoutProvider> =
        Arc::new(StripeCheckout::new(&config.stripe, &config.base_url));

    let state = AppState::from_parts(db, config, checkout, notifier);
    notifications::sweeps::spawn(&state);

    let app = app::build_app(state);
    app::serve(app).await
}
