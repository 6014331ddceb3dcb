use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// 时序存储配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// 数据库连接串（sqlite:// 或 postgres://）
    #[serde(default = "default_store_url")]
    pub url: String,

    /// 写入批量大小
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// 导入配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// 包含 gateways/ 与 sensors/ 的数据目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// 默认值函数
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_store_url() -> String {
    "sqlite://flux_telemetry.db?mode=rwc".to_string()
}

fn default_batch_size() -> usize {
    5000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        if self.store.url.trim().is_empty() {
            return Err(anyhow!("store.url must not be empty"));
        }

        if self.store.batch_size == 0 {
            return Err(anyhow!("store.batch_size must be greater than 0"));
        }

        Ok(())
    }

    /// 服务监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
