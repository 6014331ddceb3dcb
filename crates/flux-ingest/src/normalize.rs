//! 字段规范化：字段名清洗、多值展开、数值分类
//!
//! 纯函数，不会失败

use flux_types::FieldValue;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

lazy_static! {
    /// 单位后缀，如 `-0.1°C`、`-mV`、`-RH%`、`-mm/s`
    static ref UNIT_SUFFIX: Regex =
        Regex::new(r"-[0-9.]*[°%a-zA-Z/]+$").expect("valid unit suffix pattern");
    static ref INVALID_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_]").expect("valid char pattern");
    static ref UNDERSCORES: Regex = Regex::new(r"_+").expect("valid underscore pattern");
}

/// 清洗原始字段名
///
/// `"Temperature_CHIP-0.1°C"` → `"temperature_chip"`，结果满足 `^[a-z0-9_]*$` 且幂等
pub fn clean_field_name(raw: &str) -> String {
    let name = UNIT_SUFFIX.replace(raw, "");
    let name = INVALID_CHARS.replace_all(&name, "_");
    let name = UNDERSCORES.replace_all(&name, "_");
    let name = name.strip_suffix('_').unwrap_or(&name);
    name.to_ascii_lowercase()
}

/// 数值分类：无小数部分的为整数，其余为浮点
pub fn classify_number(n: &Number) -> FieldValue {
    if let Some(i) = n.as_i64() {
        return FieldValue::Integer(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            FieldValue::Integer(f as i64)
        }
        Some(f) => FieldValue::Float(f),
        None => FieldValue::Float(f64::NAN),
    }
}

/// 将一个原始字段展开为规范字段
///
/// 数值 → `name`，字符串 → `name_str`，`{value0: .., value1: ..}` → `name_<index>` / `name_str_<index>`
pub fn flatten_field(key: &str, value: &Value) -> BTreeMap<String, FieldValue> {
    let name = clean_field_name(key);
    let mut result = BTreeMap::new();

    match value {
        Value::Number(n) => {
            result.insert(name, classify_number(n));
        }
        Value::String(s) => {
            result.insert(format!("{name}_str"), FieldValue::String(s.clone()));
        }
        Value::Object(map) => {
            for (sub_key, sub_value) in map {
                let index = sub_key.strip_prefix("value").unwrap_or(sub_key);
                insert_indexed(&mut result, &name, index, sub_value);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                insert_indexed(&mut result, &name, &i.to_string(), item);
            }
        }
        Value::Null | Value::Bool(_) => {}
    }

    result
}

fn insert_indexed(result: &mut BTreeMap<String, FieldValue>, name: &str, index: &str, value: &Value) {
    match value {
        Value::Number(n) => {
            result.insert(format!("{name}_{index}"), classify_number(n));
        }
        Value::String(s) => {
            result.insert(format!("{name}_str_{index}"), FieldValue::String(s.clone()));
        }
        _ => {}
    }
}
