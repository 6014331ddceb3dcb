use crate::{handlers, state::AppState};
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/api/health", get(handlers::health_check))

        // 设备查询 API
        .route("/api/devices", get(handlers::list_devices))
        .route("/api/devices/:mac", get(handlers::get_device))
        .route("/api/devices/:mac/display", get(handlers::get_device_display))

        // 历史数据 API
        .route("/api/devices/:mac/fields", get(handlers::get_fields))
        .route("/api/devices/:mac/history", get(handlers::get_history))

        // 添加中间件
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
