use flux_device::{DeviceAggregator, HistoryReader};
use flux_timeseries::PointStore;
use std::sync::Arc;

/// API 应用状态
#[derive(Clone)]
pub struct AppState {
    /// 设备聚合器
    pub aggregator: Arc<DeviceAggregator>,
    /// 历史数据读取器
    pub history: Arc<HistoryReader>,
}

impl AppState {
    /// 以同一个存储后端创建应用状态
    pub fn new(store: Arc<dyn PointStore>) -> Self {
        Self {
            aggregator: Arc::new(DeviceAggregator::new(store.clone())),
            history: Arc::new(HistoryReader::new(store)),
        }
    }
}
