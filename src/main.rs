use axum::serve;
use project_report::api::handlers::{AppState, ServiceSettings};
use project_report::api::routes::create_router;
use project_report::config::AppConfig;
use project_report::seed;
use project_report::store::{FsBlobStore, MemoryStore, PostgresStore, Store, StoreBundle};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}, storage={}",
        config.server.host,
        config.server.port,
        config.storage.root
    );

    let blobs = FsBlobStore::new(&config.storage.root, &config.storage.public_base_url);

    if config.database.in_memory {
        log::info!("Using in-memory record store");
        let store = Arc::new(StoreBundle::new(MemoryStore::new(), blobs));
        start(store, "memory", &config).await
    } else {
        log::info!("Connecting to PostgreSQL...");
        let database_url = config.database_url()?;
        let postgres_store =
            PostgresStore::new(&database_url, config.database.max_connections.unwrap_or(20)).await?;
        postgres_store.migrate().await?;
        log::info!("Database ready");

        let store = Arc::new(StoreBundle::new(postgres_store, blobs));
        start(store, "postgres", &config).await
    }
}

async fn start<S: Store + 'static>(store: Arc<S>, database: &str, config: &AppConfig) -> anyhow::Result<()> {
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    let settings = ServiceSettings {
        report: config.report.clone(),
        database: database.to_string(),
        bucket: config.storage.bucket.clone(),
    };

    let app = create_router()
        .with_state(AppState::new(store, settings))
        .nest_service("/files", ServeDir::new(&config.storage.root));

    run_server(app, config).await
}

async fn run_server(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Project report server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
