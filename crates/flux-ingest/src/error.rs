use std::path::PathBuf;
use thiserror::Error;

/// 单条记录错误
#[derive(Error, Debug)]
pub enum RecordError {
    /// 缺少时间戳
    #[error("Missing timestamp")]
    MissingTimestamp,

    /// 时间戳无法解析
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// 记录不是 JSON 对象
    #[error("Record is not a JSON object")]
    NotAnObject,
}

/// 导入错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    /// 文件读取错误
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析错误
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 记录格式错误，整次导入失败
    #[error("Malformed record #{index} in {path}: {source}")]
    Record {
        path: PathBuf,
        index: usize,
        #[source]
        source: RecordError,
    },

    /// 存储错误
    #[error("Store error: {0}")]
    Store(#[from] flux_timeseries::StoreError),
}

/// 导入结果类型
pub type Result<T> = std::result::Result<T, IngestError>;
