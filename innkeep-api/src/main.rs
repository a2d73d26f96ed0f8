use anyhow::Context;
use innkeep_api::{app, worker, AppState, BroadcastPublisher, Metrics};
use innkeep_core::{AccessPolicy, SystemClock};
use innkeep_frontdesk::FrontDesk;
use innkeep_store::{app_config::Config, DbClient, EventProducer, PgStore, RedisClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "innkeep_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Innkeep front desk on port {}", config.server.port);

    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let redis = match &config.redis {
        Some(redis) => Some(Arc::new(
            RedisClient::new(&redis.url).await.context("Failed to connect to Redis")?,
        )),
        None => {
            tracing::warn!("No Redis configured, rate limiting disabled");
            None
        }
    };

    let kafka = match &config.kafka {
        Some(kafka) => Some(Arc::new(
            EventProducer::new(&kafka.brokers, &kafka.topic).context("Failed to create Kafka producer")?,
        )),
        None => None,
    };

    let access = AccessPolicy::from_roles(&config.access.roles).context("Invalid access roles")?;

    // SSE Broadcast Channel
    let (events_tx, _) = tokio::sync::broadcast::channel(100);

    let front_desk = Arc::new(FrontDesk::new(
        Arc::new(PgStore::new(db.pool.clone())),
        Arc::new(BroadcastPublisher::new(events_tx.clone(), kafka)),
        Arc::new(SystemClock),
    ));

    tokio::spawn(worker::start_hold_expiry_worker(
        front_desk.clone(),
        config.holds.sweep_interval_seconds,
    ));

    let app_state = AppState {
        front_desk,
        access: Arc::new(access),
        redis,
        rate_limit: config.rate_limit.clone(),
        events_tx,
        metrics: Arc::new(Metrics::new().context("Failed to register metrics")?),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app(app_state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
