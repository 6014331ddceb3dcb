use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use flux_device::{display_field, format_timestamp};
use tracing::debug;

/// 健康检查
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// 列出设备
pub async fn list_devices(State(state): State<AppState>) -> Result<Json<DeviceListResponse>> {
    debug!("Listing devices");

    let devices = state.aggregator.list_devices().await?;

    Ok(Json(devices.into()))
}

/// 获取设备
pub async fn get_device(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<DeviceResponse>> {
    debug!(mac = %mac, "Getting device");

    let device = state
        .aggregator
        .get_device(&mac)
        .await?
        .ok_or(ApiError::DeviceNotFound(mac))?;

    Ok(Json(DeviceResponse { device }))
}

/// 获取设备的展示用读数
pub async fn get_device_display(
    State(state): State<AppState>,
    Path(mac): Path<String>,
) -> Result<Json<DisplayResponse>> {
    debug!(mac = %mac, "Formatting device readings");

    let device = state
        .aggregator
        .get_device(&mac)
        .await?
        .ok_or_else(|| ApiError::DeviceNotFound(mac.clone()))?;

    // readings 是 BTreeMap，天然按字段名排序
    let fields = device
        .readings
        .iter()
        .map(|(field, value)| display_field(field, value))
        .collect();

    Ok(Json(DisplayResponse {
        mac,
        last_seen: device.last_seen,
        last_seen_text: format_timestamp(device.last_seen),
        fields,
    }))
}
