use chrono::{DateTime, Utc};
use flux_timeseries::PointRow;
use flux_types::{DeviceCategory, FieldValue};
use serde::Serialize;
use std::collections::BTreeMap;

/// 设备当前状态（读模型，每次查询重新构建，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// MAC 地址（唯一键）
    pub mac: String,

    /// 设备型号，如 `GTW-100`
    #[serde(rename = "type")]
    pub device_type: String,

    pub category: DeviceCategory,

    pub gateway_id: String,

    pub group_id: String,

    /// 所有字段观测时间中的最大值
    pub last_seen: DateTime<Utc>,

    /// 每个字段各自的最新值
    pub readings: BTreeMap<String, FieldValue>,
}

impl Device {
    /// 由首行的标签初始化
    pub fn from_row(row: &PointRow, category: DeviceCategory) -> Self {
        Self {
            mac: row.tags.device_mac.clone(),
            device_type: row.tags.device_type.clone(),
            category,
            gateway_id: row.tags.gateway_id.clone(),
            group_id: row.tags.group_id.clone(),
            last_seen: row.time,
            readings: BTreeMap::new(),
        }
    }

    /// 合并一行：更新读数，并把 `last_seen` 推进到更晚的时间
    pub fn apply(&mut self, row: PointRow) {
        if row.time > self.last_seen {
            self.last_seen = row.time;
        }
        self.readings.insert(row.field, row.value);
    }
}

/// 历史序列中的一个点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySample {
    pub time: DateTime<Utc>,
    pub value: FieldValue,
}

impl From<PointRow> for HistorySample {
    fn from(row: PointRow) -> Self {
        Self {
            time: row.time,
            value: row.value,
        }
    }
}
