use chrono::{DateTime, Utc};
use flux_types::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认测量名称
pub const DEFAULT_MEASUREMENT: &str = "device_readings";

/// 缺省标签值
pub const UNKNOWN_TAG: &str = "unknown";

/// 设备标签集合
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tags {
    pub device_mac: String,
    pub device_type: String,
    pub device_category: String,
    pub gateway_id: String,
    pub group_id: String,
}

impl Default for Tags {
    fn default() -> Self {
        Self {
            device_mac: UNKNOWN_TAG.to_string(),
            device_type: UNKNOWN_TAG.to_string(),
            device_category: UNKNOWN_TAG.to_string(),
            gateway_id: UNKNOWN_TAG.to_string(),
            group_id: UNKNOWN_TAG.to_string(),
        }
    }
}

/// 时序数据点
///
/// 构建后不可变，写入时所有权转交给存储
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    measurement: String,
    tags: Tags,
    timestamp: DateTime<Utc>,
    fields: BTreeMap<String, FieldValue>,
}

impl Point {
    pub fn new(
        measurement: impl Into<String>,
        tags: Tags,
        timestamp: DateTime<Utc>,
        fields: BTreeMap<String, FieldValue>,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
            timestamp,
            fields,
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// 按字段展开为查询行
    pub fn rows(&self) -> impl Iterator<Item = PointRow> + '_ {
        self.fields.iter().map(|(field, value)| PointRow {
            tags: self.tags.clone(),
            field: field.clone(),
            value: value.clone(),
            time: self.timestamp,
        })
    }
}

/// 查询结果行：一个标签集合下某个字段的一次观测
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRow {
    pub tags: Tags,
    pub field: String,
    pub value: FieldValue,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_point_rows() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 9, 22, 4, 45).unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("humidity".to_string(), FieldValue::Integer(8));
        fields.insert("status_str".to_string(), FieldValue::from("ok"));

        let point = Point::new(DEFAULT_MEASUREMENT, Tags::default(), ts, fields);
        let rows: Vec<PointRow> = point.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field, "humidity");
        assert_eq!(rows[1].value, FieldValue::from("ok"));
        assert!(rows.iter().all(|r| r.time == ts));
    }

    #[test]
    fn test_default_tags_are_unknown() {
        let tags = Tags::default();
        assert_eq!(tags.device_mac, UNKNOWN_TAG);
        assert_eq!(tags.group_id, UNKNOWN_TAG);
    }
}
