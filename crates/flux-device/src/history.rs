use crate::error::Result;
use crate::model::HistorySample;
use chrono::Utc;
use flux_timeseries::{GroupBy, PointQuery, PointStore, TimeBound};
use std::sync::Arc;
use tracing::debug;

/// 历史数据读取器
pub struct HistoryReader {
    store: Arc<dyn PointStore>,
}

impl HistoryReader {
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self { store }
    }

    /// 可绘制的字段：最新值为数值的字段，按名称排序
    pub async fn fields(&self, mac: &str) -> Result<Vec<String>> {
        let query = PointQuery::all_time(Utc::now())
            .with_device(mac)
            .last(GroupBy::Field);

        let rows = self.store.query(&query).await?;

        let mut fields: Vec<String> = rows
            .into_iter()
            .filter(|row| row.value.is_numeric())
            .map(|row| row.field)
            .collect();
        fields.sort();
        fields.dedup();

        Ok(fields)
    }

    /// 某设备某字段在 `[start, stop)` 内的全部点，按时间升序
    pub async fn history(
        &self,
        mac: &str,
        field: &str,
        start: TimeBound,
        stop: TimeBound,
    ) -> Result<Vec<HistorySample>> {
        let now = Utc::now();
        let query = PointQuery::new(start.resolve(now)?, stop.resolve(now)?)
            .with_device(mac)
            .with_field(field);

        let rows = self.store.query(&query).await?;
        debug!(mac = %mac, field = %field, count = rows.len(), "Loaded field history");

        Ok(rows.into_iter().map(HistorySample::from).collect())
    }
}
