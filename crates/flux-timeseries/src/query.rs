use crate::error::{Result, StoreError};
use crate::model::{PointRow, DEFAULT_MEASUREMENT};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 时间边界
///
/// 支持 `0`（全部时间）、Unix 秒、`now()`、相对时长（`-7d`、`-1h30m`）与 RFC 3339 时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Epoch,
    Now,
    Absolute(DateTime<Utc>),
    /// 相对查询时刻向前偏移
    Ago(Duration),
}

impl TimeBound {
    /// 以查询时刻 `now` 解析为绝对时间，偏移超出可表示范围时返回错误
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            TimeBound::Epoch => Ok(DateTime::<Utc>::UNIX_EPOCH),
            TimeBound::Now => Ok(now),
            TimeBound::Absolute(t) => Ok(*t),
            TimeBound::Ago(d) => now.checked_sub_signed(*d).ok_or_else(|| {
                StoreError::InvalidTimeBound(format!("-{}s is out of range", d.num_seconds()))
            }),
        }
    }
}

impl FromStr for TimeBound {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StoreError::InvalidTimeBound("empty".to_string()));
        }
        if s == "now()" || s == "now" {
            return Ok(TimeBound::Now);
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            let secs: i64 = s
                .parse()
                .map_err(|_| StoreError::InvalidTimeBound(s.to_string()))?;
            if secs == 0 {
                return Ok(TimeBound::Epoch);
            }
            return Utc
                .timestamp_opt(secs, 0)
                .single()
                .map(TimeBound::Absolute)
                .ok_or_else(|| StoreError::InvalidTimeBound(s.to_string()));
        }
        if let Some(rest) = s.strip_prefix('-') {
            return parse_duration(rest)
                .map(TimeBound::Ago)
                .ok_or_else(|| StoreError::InvalidTimeBound(s.to_string()));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|t| TimeBound::Absolute(t.with_timezone(&Utc)))
            .map_err(|_| StoreError::InvalidTimeBound(s.to_string()))
    }
}

/// 解析 `1h30m` 形式的时长
fn parse_duration(s: &str) -> Option<Duration> {
    let mut total = Duration::zero();
    let mut rest = s;
    if rest.is_empty() {
        return None;
    }
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return None;
        }
        let amount: i64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let unit_len = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let part = match unit {
            "ns" => Some(Duration::nanoseconds(amount)),
            "us" | "µs" => Some(Duration::microseconds(amount)),
            "ms" => Duration::try_milliseconds(amount),
            "s" => Duration::try_seconds(amount),
            "m" => Duration::try_minutes(amount),
            "h" => Duration::try_hours(amount),
            "d" => Duration::try_days(amount),
            "w" => Duration::try_weeks(amount),
            _ => None,
        }?;
        total = total.checked_add(&part)?;
    }
    Some(total)
}

/// 分组方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// 按完整标签集合 + 字段名分组
    TagsAndField,
    /// 仅按字段名分组（单设备查询时标签一致）
    Field,
}

/// 选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// 返回范围内全部点，按时间升序
    All,
    /// 每组只返回时间最新的一个点
    Last(GroupBy),
}

/// 点查询：范围 + 过滤 + 分组 + 选择
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointQuery {
    pub measurement: String,

    /// 起始时间（含）
    pub start: DateTime<Utc>,

    /// 结束时间（不含）
    pub stop: DateTime<Utc>,

    pub device_mac: Option<String>,

    pub field: Option<String>,

    /// 排除的字段
    pub exclude_fields: Vec<String>,

    pub selection: Selection,
}

impl PointQuery {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self {
            measurement: DEFAULT_MEASUREMENT.to_string(),
            start,
            stop,
            device_mac: None,
            field: None,
            exclude_fields: Vec::new(),
            selection: Selection::All,
        }
    }

    /// 从纪元到 `now` 的全部时间
    pub fn all_time(now: DateTime<Utc>) -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH, now)
    }

    pub fn with_device(mut self, device_mac: impl Into<String>) -> Self {
        self.device_mac = Some(device_mac.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn excluding(mut self, field: impl Into<String>) -> Self {
        self.exclude_fields.push(field.into());
        self
    }

    pub fn last(mut self, group_by: GroupBy) -> Self {
        self.selection = Selection::Last(group_by);
        self
    }

    /// 判断一行是否满足过滤条件
    pub fn matches(&self, measurement: &str, row: &PointRow) -> bool {
        measurement == self.measurement
            && row.time >= self.start
            && row.time < self.stop
            && self
                .device_mac
                .as_ref()
                .map_or(true, |mac| &row.tags.device_mac == mac)
            && self.field.as_ref().map_or(true, |f| &row.field == f)
            && !self.exclude_fields.iter().any(|f| f == &row.field)
    }
}
