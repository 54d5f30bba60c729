use crate::{
    error::{AppError, Result},
    state::AppState,
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod profiles;
pub mod series;
pub mod uploads;

/// 组装全部API路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/profiles", profiles::router())
        .nest("/series", series::router().merge(uploads::router()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "Media library is running!"
}

/// 解析路径中的0起始位置参数，不接受负数
pub(crate) fn parse_index(raw: &str, what: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| AppError::Validation(format!("Invalid {} index '{}'", what, raw)))
}
