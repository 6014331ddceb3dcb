use thiserror::Error;

/// 设备查询错误类型
#[derive(Error, Debug)]
pub enum DeviceError {
    /// 存储错误
    #[error("Store error: {0}")]
    Store(#[from] flux_timeseries::StoreError),
}

/// 设备查询结果类型
pub type Result<T> = std::result::Result<T, DeviceError>;
