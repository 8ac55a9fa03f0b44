use std::net::SocketAddr;
use talentflow_backend::{
    config::Config,
    database::{pool::create_pool, seed},
    middleware::chaos::ChaosConfig,
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    if config.seed_on_start && seed::seed_if_empty(&pool).await? {
        info!("Database seeded with demo data");
    }

    let chaos = ChaosConfig {
        failure_rate: config.chaos_failure_rate,
        latency_min_ms: config.chaos_latency_min_ms,
        latency_max_ms: config.chaos_latency_max_ms,
    };

    let app_state = AppState::new(pool);
    let app = routes::api_router(app_state, chaos)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
