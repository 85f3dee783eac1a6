use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use wrantle_core::config::Config;
use wrantle_core::tracing::init_tracing;

use wrantle_site::config::SiteConfig;
use wrantle_site::infra::mailer::{ConfiguredMailer, MailSettings};
use wrantle_site::infra::outbox::OutboxRelay;
use wrantle_site::router::build_router;
use wrantle_site::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("info,sqlx=warn");

    let config = SiteConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let mailer =
        ConfiguredMailer::from_smtp_url(config.smtp_url.as_deref()).expect("invalid SMTP_URL");

    let state = AppState {
        db,
        redis,
        config: Arc::new(config),
    };

    // Outbox relay
    let relay = OutboxRelay {
        outbox: state.outbox_repo(),
        mailer,
        settings: MailSettings::from_config(&state.config),
    };
    let poll_interval = Duration::from_secs(state.config.outbox_poll_interval_secs.max(1));
    tokio::spawn(relay.run(poll_interval));

    // HTTP server
    let addr = format!("0.0.0.0:{}", state.config.site_port);
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("site service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
