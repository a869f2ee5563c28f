use sea_orm::{ConnectOptions, Database};
use tracing::info;

use santa_core::tracing::init_tracing;
use santa_session::identity::SessionSecret;

use santa_exchange::config::ExchangeConfig;
use santa_exchange::infra::identity::HttpIdentityProvider;
use santa_exchange::infra::notifier::HttpNotifier;
use santa_exchange::router::build_router;
use santa_exchange::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ExchangeConfig::from_env();

    let mut db_opts = ConnectOptions::new(config.database_url.clone());
    db_opts
        .connect_timeout(config.upstream_timeout)
        .acquire_timeout(config.upstream_timeout)
        .sqlx_logging(false);
    let db = Database::connect(db_opts)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let identity = HttpIdentityProvider::new(
        config.upstream_timeout,
        config.discord.clone(),
        config.google.clone(),
        config.public_base_url.clone(),
    )
    .expect("failed to build identity provider client");
    let notifier = HttpNotifier::new(
        config.upstream_timeout,
        config.email.clone(),
        config.whatsapp.clone(),
    )
    .expect("failed to build notifier client");

    if identity.discord.is_none() && identity.google.is_none() {
        tracing::warn!("no sign-in provider configured; admin sign-in is disabled");
    }

    let state = AppState {
        db,
        redis,
        session_secret: SessionSecret::new(config.session_secret),
        public_base_url: config.public_base_url,
        identity,
        notifier,
        upstream_timeout: config.upstream_timeout,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.exchange_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("exchange service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
