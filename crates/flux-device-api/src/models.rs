use chrono::{DateTime, Utc};
use flux_device::{Device, DisplayField, HistorySample};
use serde::{Deserialize, Serialize};

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// 设备列表响应
#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<Device>,
    pub count: usize,
}

impl From<Vec<Device>> for DeviceListResponse {
    fn from(devices: Vec<Device>) -> Self {
        Self {
            count: devices.len(),
            devices,
        }
    }
}

/// 单设备响应
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub device: Device,
}

/// 可绘制字段响应
#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub mac: String,
    pub fields: Vec<String>,
}

/// 历史查询参数
///
/// `start` 缺省为 `0`（全部时间），`stop` 缺省为 `now()`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub field: Option<String>,
    pub start: Option<String>,
    pub stop: Option<String>,
}

/// 历史序列响应
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub mac: String,
    pub field: String,
    pub count: usize,
    pub data: Vec<HistorySample>,
}

/// 展示用读数响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayResponse {
    pub mac: String,
    pub last_seen: DateTime<Utc>,
    pub last_seen_text: String,
    pub fields: Vec<DisplayField>,
}
