use crate::error::Result;
use crate::model::Device;
use chrono::Utc;
use flux_timeseries::{GroupBy, PointQuery, PointRow, PointStore};
use flux_types::DeviceCategory;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 设备列表中不展示的字段
pub const LIST_EXCLUDED_FIELDS: [&str; 1] = ["signal_quality"];

/// 设备聚合器
///
/// 查询每个 (设备, 字段) 的最新值，合并为设备当前状态
pub struct DeviceAggregator {
    store: Arc<dyn PointStore>,
}

impl DeviceAggregator {
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self { store }
    }

    /// 列出所有设备：网关在前，同类别内按型号排序
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let query = LIST_EXCLUDED_FIELDS
            .iter()
            .fold(PointQuery::all_time(Utc::now()), |q, f| q.excluding(*f))
            .last(GroupBy::TagsAndField);

        let rows = self.store.query(&query).await?;
        debug!(rows = rows.len(), "Aggregating device list");

        let mut devices = fold_devices(rows);
        sort_devices(&mut devices);
        Ok(devices)
    }

    /// 获取单个设备；无数据时返回 `None`
    pub async fn get_device(&self, mac: &str) -> Result<Option<Device>> {
        let query = PointQuery::all_time(Utc::now())
            .with_device(mac)
            .last(GroupBy::Field);

        let rows = self.store.query(&query).await?;
        debug!(mac = %mac, rows = rows.len(), "Aggregating device");

        Ok(fold_devices(rows).into_iter().next())
    }
}

/// 按 MAC 合并行：首行初始化设备，之后每行更新读数与 `last_seen`
pub fn fold_devices(rows: impl IntoIterator<Item = PointRow>) -> Vec<Device> {
    let mut order: Vec<String> = Vec::new();
    let mut devices: HashMap<String, Device> = HashMap::new();

    for row in rows {
        let mac = row.tags.device_mac.clone();

        if !devices.contains_key(&mac) {
            let category = match row.tags.device_category.parse::<DeviceCategory>() {
                Ok(category) => category,
                Err(e) => {
                    warn!(mac = %mac, error = %e, "Skipping row with unknown category");
                    continue;
                }
            };
            devices.insert(mac.clone(), Device::from_row(&row, category));
            order.push(mac.clone());
        }

        if let Some(device) = devices.get_mut(&mac) {
            device.apply(row);
        }
    }

    order
        .into_iter()
        .filter_map(|mac| devices.remove(&mac))
        .collect()
}

/// 排序：类别（网关优先）→ 型号 → MAC
pub fn sort_devices(devices: &mut [Device]) {
    devices.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.device_type.cmp(&b.device_type))
            .then_with(|| a.mac.cmp(&b.mac))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};
    use flux_timeseries::Tags;
    use flux_types::FieldValue;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, 22, 0, 0).unwrap() + Duration::seconds(secs)
    }

    fn row(mac: &str, device_type: &str, category: &str, field: &str, value: i64, secs: i64) -> PointRow {
        PointRow {
            tags: Tags {
                device_mac: mac.to_string(),
                device_type: device_type.to_string(),
                device_category: category.to_string(),
                gateway_id: "GW1".to_string(),
                group_id: "G1".to_string(),
            },
            field: field.to_string(),
            value: FieldValue::Integer(value),
            time: t(secs),
        }
    }

    #[test]
    fn test_last_seen_is_max_over_fields() {
        let devices = fold_devices(vec![
            row("AA", "AT-105", "sensor", "voltage", 3025, 60),
            row("AA", "AT-105", "sensor", "humidity", 8, 10),
        ]);

        assert_eq!(devices.len(), 1);
        let device = &devices[0];
        assert_eq!(device.last_seen, t(60));
        assert_eq!(device.readings["voltage"], FieldValue::Integer(3025));
        assert_eq!(device.readings["humidity"], FieldValue::Integer(8));
    }

    #[test]
    fn test_gateways_sort_first() {
        let mut devices = fold_devices(vec![
            row("01", "AT-105", "sensor", "humidity", 8, 0),
            row("ZZ", "GTW-100", "gateway", "voltage", 1, 0),
            row("02", "AB-200", "sensor", "humidity", 8, 0),
        ]);
        sort_devices(&mut devices);

        let macs: Vec<&str> = devices.iter().map(|d| d.mac.as_str()).collect();
        assert_eq!(macs, vec!["ZZ", "02", "01"]);
        assert_eq!(devices[0].category, DeviceCategory::Gateway);
    }

    #[test]
    fn test_unknown_category_skipped() {
        let devices = fold_devices(vec![row("AA", "X", "unknown", "humidity", 1, 0)]);
        assert!(devices.is_empty());
    }
}
