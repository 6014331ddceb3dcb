use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 设备类别
///
/// 排序时网关排在传感器之前
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Gateway,
    Sensor,
}

#[derive(Debug, Error)]
#[error("Unknown device category: {0}")]
pub struct ParseCategoryError(pub String);

impl DeviceCategory {
    pub const ALL: [DeviceCategory; 2] = [DeviceCategory::Gateway, DeviceCategory::Sensor];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Gateway => "gateway",
            DeviceCategory::Sensor => "sensor",
        }
    }

    /// 数据目录下对应的子目录名
    pub fn folder(&self) -> &'static str {
        match self {
            DeviceCategory::Gateway => "gateways",
            DeviceCategory::Sensor => "sensors",
        }
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gateway" => Ok(DeviceCategory::Gateway),
            "sensor" => Ok(DeviceCategory::Sensor),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}
