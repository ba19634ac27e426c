/**
 * Planning Core - Main Entry Point
 * Collaborative event-planning session server
 */
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planning_core::api::build_router;
use planning_core::api::state::AppState;
use planning_core::config::Config;
use planning_core::config_validation;
use planning_core::core::clock::SystemClock;
use planning_core::core::ids::UuidGenerator;
use planning_core::core::token::CsprngTokenGenerator;
use planning_core::core::Coordinator;
use planning_core::store::InMemoryStore;
#[cfg(feature = "postgres")]
use planning_core::store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planning_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    if let Err(e) = config_validation::validate_config(&config) {
        tracing::error!("configuration validation failed: {}", e);
        return Err(e);
    }

    info!("starting planning-core v{}", env!("CARGO_PKG_VERSION"));
    info!("listening on {}:{}", config.host, config.port);

    let store = build_store(&config).await?;

    let coordinator = Arc::new(Coordinator::new(
        store,
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
        Arc::new(CsprngTokenGenerator::default()),
        config.invite_base_url.clone(),
    ));

    spawn_archival_sweep(Arc::clone(&coordinator), &config);

    let state = AppState {
        coordinator,
        config: Arc::new(config.clone()),
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("server ready at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn planning_core::core::store::Store>> {
    if let Some(ref db_url) = config.database_url {
        info!("connecting to postgres...");
        let store = PostgresStore::connect(db_url).await?;
        info!("postgres connected, migrations applied");
        Ok(Arc::new(store))
    } else {
        info!("no DATABASE_URL set, using in-memory store");
        Ok(Arc::new(InMemoryStore::default()))
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_store(_config: &Config) -> anyhow::Result<Arc<dyn planning_core::core::store::Store>> {
    info!("using in-memory store (postgres feature not enabled)");
    Ok(Arc::new(InMemoryStore::default()))
}

/// Periodic caller invoking `ArchiveInactive` (spec §1: "archival scheduling
/// (a periodic caller that invokes the core's archive operation)" is an
/// external collaborator, not part of the core itself).
fn spawn_archival_sweep(coordinator: Arc<Coordinator>, config: &Config) {
    let interval = std::time::Duration::from_secs(config.archive_sweep_interval_secs);
    let cutoff = chrono::Duration::hours(config.archive_cutoff_hours);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match coordinator.archive_inactive(cutoff).await {
                Ok(count) if count > 0 => info!(count, "archived inactive sessions"),
                Ok(_) => {}
                Err(err) => tracing::error!(error = %err, "archival sweep failed"),
            }
        }
    });
}
