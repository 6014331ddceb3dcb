use crate::error::RecordError;
use crate::normalize::flatten_field;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use flux_timeseries::{Point, Tags, DEFAULT_MEASUREMENT, UNKNOWN_TAG};
use flux_types::{DeviceCategory, FieldValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// 原始记录：设备上报的一条任意 JSON 对象
pub type RawRecord = Map<String, Value>;

/// 规范化后的信号质量字段名
pub const SIGNAL_QUALITY_FIELD: &str = "signal_quality";

const TIME_KEY: &str = "time";
const MAC_KEY: &str = "measure_name";
const GATEWAY_KEY: &str = "GatewayID";
const GROUP_KEY: &str = "GroupID";

/// 信号质量的两种拼写（后者是 TP-400R8 数据中的拼写错误）
const SIGNAL_QUALITY_KEYS: [&str; 2] = ["Received_Signal_Quality", "Recieved_Signal_Quality"];

/// 不作为测量值的元数据字段
const SKIP_FIELDS: [&str; 11] = [
    "Prefix",
    "NumberOfAttributes",
    "measure_name",
    "MacAddress",
    "GatewayID",
    "GroupID",
    "time",
    "SignalTimestamp",
    "Capture_Timestamp",
    "Received_Signal_Quality",
    "Recieved_Signal_Quality",
];

const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// 解析 `"YYYY-MM-DD HH:MM:SS.fffffffff"`，截断到毫秒并按 UTC 解释
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc().trunc_subsecs(3))
        .ok_or_else(|| RecordError::InvalidTimestamp(text.to_string()))
}

/// 数据点构建器
///
/// 设备类型与类别由调用方根据来源文件名和目录提供
#[derive(Debug, Clone)]
pub struct PointBuilder {
    device_type: String,
    category: DeviceCategory,
}

impl PointBuilder {
    pub fn new(device_type: impl Into<String>, category: DeviceCategory) -> Self {
        Self {
            device_type: device_type.into(),
            category,
        }
    }

    /// 由一条原始记录构建数据点
    pub fn build(&self, record: &RawRecord) -> Result<Point, RecordError> {
        let timestamp = match record.get(TIME_KEY) {
            Some(Value::String(text)) => parse_timestamp(text)?,
            Some(Value::Null) | None => return Err(RecordError::MissingTimestamp),
            Some(other) => return Err(RecordError::InvalidTimestamp(other.to_string())),
        };

        let tags = Tags {
            device_mac: tag_value(record, MAC_KEY),
            device_type: self.device_type.clone(),
            device_category: self.category.as_str().to_string(),
            gateway_id: tag_value(record, GATEWAY_KEY),
            group_id: tag_value(record, GROUP_KEY),
        };

        let mut fields = BTreeMap::new();

        if let Some(quality) = signal_quality(record) {
            fields.insert(SIGNAL_QUALITY_FIELD.to_string(), FieldValue::Integer(quality));
        }

        for (key, value) in record {
            if SKIP_FIELDS.contains(&key.as_str()) {
                continue;
            }
            for (name, value) in flatten_field(key, value) {
                if let Some(previous) = fields.insert(name.clone(), value) {
                    debug!(field = %name, key = %key, previous = %previous, "Field name collision, keeping later value");
                }
            }
        }

        Ok(Point::new(DEFAULT_MEASUREMENT, tags, timestamp, fields))
    }
}

/// 标签取值，缺失或为空时为 `"unknown"`
fn tag_value(record: &RawRecord, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_TAG.to_string(),
    }
}

/// 合并两种拼写的信号质量：优先取非 null 的正确拼写，否则取另一拼写；
/// 该键存在但非数值（含 null）时记 0
fn signal_quality(record: &RawRecord) -> Option<i64> {
    let [primary, fallback] = SIGNAL_QUALITY_KEYS;
    let value = record
        .get(primary)
        .filter(|v| !v.is_null())
        .or_else(|| record.get(fallback))?;

    Some(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    })
}
