use std::sync::Arc;
use axum::http::{HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing::info;

use media_library::{
    config::Config,
    routes,
    services::{database, storage},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level));
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting media library service...");

    let db = database::connect(&config).await?;
    let blobs = storage::connect(&config).await?;
    let app_state = Arc::new(AppState::new(config.clone(), db, blobs));

    // 配置 CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);
    let cors = if config.cors_allowed_origins.trim() == "*" {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .map(|origin| origin.trim().parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    let mut app = routes::router(app_state);
    if config.storage_type == "local" {
        info!("Serving uploads from {}", config.upload_dir);
        app = app.nest_service("/uploads", ServeDir::new(&config.upload_dir));
    }
    let app = app.layer(cors).layer(CompressionLayer::new());

    // 启动主服务器
    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
