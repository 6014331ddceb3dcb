use thiserror::Error;

/// 时序存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// 时间边界无效
    #[error("Invalid time bound: {0}")]
    InvalidTimeBound(String),

    /// 存储中的数据无法解析
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// 存储不可用
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// 时序存储结果类型
pub type Result<T> = std::result::Result<T, StoreError>;
