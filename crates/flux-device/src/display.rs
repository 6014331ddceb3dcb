//! 字段名与字段值的展示格式

use chrono::{DateTime, Utc};
use flux_types::FieldValue;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;

/// 展示用字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayField {
    pub field: String,
    pub label: String,
    pub value_text: String,
}

/// 生成字段的展示名与展示值
pub fn display_field(field: &str, value: &FieldValue) -> DisplayField {
    DisplayField {
        field: field.to_string(),
        label: format_field_name(field),
        value_text: format_field_value(field, value),
    }
}

const KNOWN_LABELS: [(&str, &str); 18] = [
    ("temperature_chip", "Temperature (Chip)"),
    ("temperature_ntc", "Temperature (NTC)"),
    ("temperature_rtd", "Temperature (RTD)"),
    ("humidity", "Humidity"),
    ("voltage", "Voltage"),
    ("fault_status", "Fault Status"),
    ("signal_quality", "Signal Quality"),
    ("battery_voltage", "Battery Voltage"),
    ("battery_capacity", "Battery Capacity"),
    ("charge_percentage", "Charge"),
    ("state_of_charge", "State of Charge"),
    ("bat_charging_status", "Charging Status"),
    ("ble_buffer_status", "BLE Buffer"),
    ("gtw_host_status", "Gateway Host Status"),
    ("device_angle", "Device Angle"),
    ("coulomb_count", "Coulomb Count"),
    ("charge_status", "Charge Status"),
    ("wgr_fault_status", "Gauge Fault Status"),
];

/// 带序号/通道后缀的字段名规则
#[derive(Debug, Clone, Copy)]
enum LabelRule {
    Axis,
    VibrationBand,
    RtdChannel,
    VoltageChannel,
    CurrentChannel,
    GaugeReport,
}

lazy_static! {
    /// 按顺序匹配
    static ref LABEL_PATTERNS: [(Regex, LabelRule); 6] = [
        (Regex::new(r"^acceleration_(\d)$").expect("valid pattern"), LabelRule::Axis),
        (Regex::new(r"^vibration_([xyz])_(\d)$").expect("valid pattern"), LabelRule::VibrationBand),
        (Regex::new(r"^temperature_rtd_(\d)$").expect("valid pattern"), LabelRule::RtdChannel),
        (Regex::new(r"^voltage_(\d+)$").expect("valid pattern"), LabelRule::VoltageChannel),
        (Regex::new(r"^current_(\d+)$").expect("valid pattern"), LabelRule::CurrentChannel),
        (Regex::new(r"^wgr_gauge_report_(\d)$").expect("valid pattern"), LabelRule::GaugeReport),
    ];
}

impl LabelRule {
    fn label(self, caps: &Captures) -> Option<String> {
        match self {
            LabelRule::Axis => {
                let axis = match &caps[1] {
                    "0" => "X",
                    "1" => "Y",
                    "2" => "Z",
                    other => other,
                };
                Some(format!("Acceleration ({axis})"))
            }
            LabelRule::VibrationBand => Some(format!(
                "Vibration {} (Band {})",
                caps[1].to_ascii_uppercase(),
                one_based(&caps[2])?
            )),
            LabelRule::RtdChannel => Some(format!("Temperature RTD (Ch {})", one_based(&caps[1])?)),
            LabelRule::VoltageChannel => Some(format!("Voltage (Ch {})", one_based(&caps[1])?)),
            LabelRule::CurrentChannel => Some(format!("Current (Ch {})", one_based(&caps[1])?)),
            LabelRule::GaugeReport => Some(format!("Gauge Report ({})", one_based(&caps[1])?)),
        }
    }
}

fn one_based(index: &str) -> Option<u64> {
    index.parse::<u64>().ok()?.checked_add(1)
}

/// 字段名 → 展示名
///
/// `temperature_chip` → `Temperature (Chip)`，`acceleration_0` → `Acceleration (X)`，
/// `vibration_x_3` → `Vibration X (Band 4)`
pub fn format_field_name(field: &str) -> String {
    if let Some((_, label)) = KNOWN_LABELS.iter().find(|(name, _)| *name == field) {
        return label.to_string();
    }

    for (pattern, rule) in LABEL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(field) {
            if let Some(text) = rule.label(&caps) {
                return text;
            }
        }
    }

    field
        .split('_')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 字段匹配方式
enum Match {
    Prefix(&'static [&'static str]),
    Exact(&'static [&'static str]),
}

impl Match {
    fn matches(&self, field: &str) -> bool {
        match self {
            Match::Prefix(prefixes) => prefixes.iter().any(|p| field.starts_with(p)),
            Match::Exact(names) => names.contains(&field),
        }
    }
}

/// 数值渲染方式
enum Render {
    /// 原始值为 0.1 单位，除以 10 保留一位小数
    Tenths(&'static str),
    /// 数值 + 空格 + 单位
    Unit(&'static str),
    /// 数值紧跟单位
    Attached(&'static str),
    /// 保留三位小数，无单位
    Fixed3,
    /// 0 为无故障，否则显示故障码
    Fault,
}

/// 数值格式规则，按顺序检查，先匹配者生效
static VALUE_RULES: [(Match, Render); 12] = [
    (Match::Prefix(&["temperature_", "battery_ntc"]), Render::Tenths("°C")),
    (Match::Exact(&["humidity"]), Render::Unit("%")),
    (Match::Prefix(&["voltage", "battery_voltage"]), Render::Unit("mV")),
    (Match::Prefix(&["acceleration"]), Render::Unit("mG")),
    (Match::Prefix(&["vibration"]), Render::Unit("mm/s")),
    (Match::Exact(&["signal_quality"]), Render::Unit("dBm")),
    (Match::Prefix(&["battery_capacity", "state_of_charge"]), Render::Unit("mAh")),
    (Match::Prefix(&["charge_percentage", "ble_buffer_status"]), Render::Unit("%")),
    (Match::Exact(&["device_angle"]), Render::Attached("°")),
    (Match::Prefix(&["current"]), Render::Unit("uA")),
    (Match::Prefix(&["wgr_gauge_report"]), Render::Fixed3),
    (Match::Exact(&["fault_status", "wgr_fault_status"]), Render::Fault),
];

/// 字段值 → 带单位的展示文本
///
/// `temperature_chip: 223` → `"22.3 °C"`，`humidity: 8` → `"8 %"`，字符串原样返回
pub fn format_field_value(field: &str, value: &FieldValue) -> String {
    let number = match value {
        FieldValue::String(s) => return s.clone(),
        FieldValue::Integer(v) => *v as f64,
        FieldValue::Float(v) => *v,
    };

    let Some((_, render)) = VALUE_RULES.iter().find(|(m, _)| m.matches(field)) else {
        return value.to_string();
    };

    match render {
        Render::Tenths(unit) => format!("{:.1} {unit}", round_half_up(number / 10.0, 1)),
        Render::Unit(unit) => format!("{value} {unit}"),
        Render::Attached(unit) => format!("{value}{unit}"),
        Render::Fixed3 => format!("{:.3}", round_half_up(number, 3)),
        Render::Fault if number == 0.0 => "No Faults".to_string(),
        Render::Fault => format!("Fault ({value})"),
    }
}

/// 定点舍入，遇 5 远离零进位
fn round_half_up(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 时间 → `Feb 9, 22:10`（UTC）
pub fn format_timestamp(time: DateTime<Utc>) -> String {
    use chrono::{Datelike, Timelike};
    let month = MONTHS[time.month0() as usize];
    format!("{month} {}, {:02}:{:02}", time.day(), time.hour(), time.minute())
}

/// 相对时间描述
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();

    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3600 => format!("{} min ago", s / 60),
        s if s < 86400 => format!("{} hours ago", s / 3600),
        s => format!("{} days ago", s / 86400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_known_labels() {
        assert_eq!(format_field_name("temperature_chip"), "Temperature (Chip)");
        assert_eq!(format_field_name("state_of_charge"), "State of Charge");
        assert_eq!(format_field_name("wgr_fault_status"), "Gauge Fault Status");
    }

    #[test]
    fn test_indexed_labels() {
        assert_eq!(format_field_name("acceleration_0"), "Acceleration (X)");
        assert_eq!(format_field_name("acceleration_2"), "Acceleration (Z)");
        assert_eq!(format_field_name("acceleration_5"), "Acceleration (5)");
        assert_eq!(format_field_name("vibration_x_3"), "Vibration X (Band 4)");
        assert_eq!(format_field_name("temperature_rtd_0"), "Temperature RTD (Ch 1)");
        assert_eq!(format_field_name("voltage_11"), "Voltage (Ch 12)");
        assert_eq!(format_field_name("current_0"), "Current (Ch 1)");
        assert_eq!(format_field_name("wgr_gauge_report_2"), "Gauge Report (3)");
    }

    #[test]
    fn test_fallback_label() {
        assert_eq!(format_field_name("gtw_uptime"), "Gtw Uptime");
        assert_eq!(format_field_name("status_str"), "Status Str");
        assert_eq!(format_field_name("acceleration_12"), "Acceleration 12");
    }

    #[test]
    fn test_value_units() {
        assert_eq!(format_field_value("temperature_chip", &FieldValue::Integer(223)), "22.3 °C");
        assert_eq!(format_field_value("battery_ntc", &FieldValue::Integer(-15)), "-1.5 °C");
        assert_eq!(format_field_value("humidity", &FieldValue::Integer(8)), "8 %");
        assert_eq!(format_field_value("voltage_0", &FieldValue::Integer(3025)), "3025 mV");
        assert_eq!(format_field_value("battery_voltage", &FieldValue::Integer(3700)), "3700 mV");
        assert_eq!(format_field_value("acceleration_1", &FieldValue::Integer(-3)), "-3 mG");
        assert_eq!(format_field_value("vibration_x_0", &FieldValue::Float(1.5)), "1.5 mm/s");
        assert_eq!(format_field_value("signal_quality", &FieldValue::Integer(-71)), "-71 dBm");
        assert_eq!(format_field_value("battery_capacity", &FieldValue::Integer(900)), "900 mAh");
        assert_eq!(format_field_value("charge_percentage", &FieldValue::Integer(55)), "55 %");
        assert_eq!(format_field_value("device_angle", &FieldValue::Integer(45)), "45°");
        assert_eq!(format_field_value("current_0", &FieldValue::Integer(12)), "12 uA");
        assert_eq!(format_field_value("wgr_gauge_report_0", &FieldValue::Float(1.5)), "1.500");
        assert_eq!(format_field_value("wgr_gauge_report_0", &FieldValue::Float(1.0625)), "1.063");
        assert_eq!(format_field_value("temperature_chip", &FieldValue::Float(222.5)), "22.3 °C");
        assert_eq!(format_field_value("temperature_ntc", &FieldValue::Float(-222.5)), "-22.3 °C");
        assert_eq!(format_field_value("coulomb_count", &FieldValue::Integer(7)), "7");
    }

    #[test]
    fn test_fault_status() {
        assert_eq!(format_field_value("fault_status", &FieldValue::Integer(0)), "No Faults");
        assert_eq!(format_field_value("fault_status", &FieldValue::Integer(2)), "Fault (2)");
        assert_eq!(format_field_value("wgr_fault_status", &FieldValue::Integer(0)), "No Faults");
    }

    #[test]
    fn test_strings_pass_through() {
        assert_eq!(
            format_field_value("temperature_chip", &FieldValue::from("offline")),
            "offline"
        );
    }

    #[test]
    fn test_display_field() {
        let field = display_field("humidity", &FieldValue::Integer(8));
        assert_eq!(field.label, "Humidity");
        assert_eq!(field.value_text, "8 %");
    }

    #[test]
    fn test_format_timestamp_and_time_ago() {
        let t = Utc.with_ymd_and_hms(2026, 2, 9, 22, 10, 55).unwrap();
        assert_eq!(format_timestamp(t), "Feb 9, 22:10");

        assert_eq!(time_ago(t, t + Duration::seconds(30)), "Just now");
        assert_eq!(time_ago(t, t + Duration::minutes(2)), "2 min ago");
        assert_eq!(time_ago(t, t + Duration::hours(3)), "3 hours ago");
        assert_eq!(time_ago(t, t + Duration::days(4)), "4 days ago");
    }
}
