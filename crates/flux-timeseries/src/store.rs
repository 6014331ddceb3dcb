use crate::error::{Result, StoreError};
use crate::model::{Point, PointRow, Tags};
use crate::query::{GroupBy, PointQuery, Selection};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use flux_types::FieldValue;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, QueryResult, Statement,
    TransactionTrait, Value,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 时序点存储 trait
///
/// 写入离散点，并支持范围 + 过滤 + 分组 + 最新值查询
#[async_trait]
pub trait PointStore: Send + Sync {
    /// 批量写入数据点
    async fn write_points(&self, points: &[Point]) -> Result<()>;

    /// 执行查询，返回带完整标签集合的行
    async fn query(&self, query: &PointQuery) -> Result<Vec<PointRow>>;

    /// 健康检查
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// 每组保留时间最新的一行；时间相同时后出现的行胜出
pub fn select_last(rows: impl IntoIterator<Item = PointRow>, group_by: GroupBy) -> Vec<PointRow> {
    let mut latest: BTreeMap<(Option<Tags>, String), PointRow> = BTreeMap::new();

    for row in rows {
        let key = match group_by {
            GroupBy::TagsAndField => (Some(row.tags.clone()), row.field.clone()),
            GroupBy::Field => (None, row.field.clone()),
        };
        match latest.get(&key) {
            Some(current) if current.time > row.time => {}
            _ => {
                latest.insert(key, row);
            }
        }
    }

    latest.into_values().collect()
}

const TABLE: &str = "device_readings";

const COLUMNS: [&str; 11] = [
    "time_ms",
    "measurement",
    "device_mac",
    "device_type",
    "device_category",
    "gateway_id",
    "group_id",
    "field",
    "value_int",
    "value_float",
    "value_str",
];

const TAG_GROUP: [&str; 7] = [
    "measurement",
    "device_mac",
    "device_type",
    "device_category",
    "gateway_id",
    "group_id",
    "field",
];

const FIELD_GROUP: [&str; 2] = ["measurement", "field"];

/// 单条 INSERT 的最大行数
const INSERT_CHUNK_ROWS: usize = 500;

/// 基于 sea-orm 的 SQL 存储实现（SQLite / PostgreSQL）
///
/// 每个 (点, 字段) 一行，按值类型分别存放在 `value_int` / `value_float` / `value_str`
pub struct SqlStore {
    db: Arc<DatabaseConnection>,
}

impl SqlStore {
    /// 连接数据库
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = Database::connect(database_url).await?;

        info!(
            backend = ?db.get_database_backend(),
            "Connected to point store"
        );

        Ok(Self { db: Arc::new(db) })
    }

    /// 创建表结构（幂等）
    pub async fn ensure_schema(&self) -> Result<()> {
        let backend = self.db.get_database_backend();
        // 自增 id 记录写入顺序，用于同一时间戳的取舍
        let id_column = match backend {
            DbBackend::Postgres => "BIGSERIAL PRIMARY KEY",
            DbBackend::MySql => "BIGINT AUTO_INCREMENT PRIMARY KEY",
            DbBackend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        };

        self.db
            .execute(Statement::from_string(
                backend,
                format!(
                    r#"
                    CREATE TABLE IF NOT EXISTS {TABLE} (
                        id {id_column},
                        time_ms BIGINT NOT NULL,
                        measurement TEXT NOT NULL,
                        device_mac TEXT NOT NULL,
                        device_type TEXT NOT NULL,
                        device_category TEXT NOT NULL,
                        gateway_id TEXT NOT NULL,
                        group_id TEXT NOT NULL,
                        field TEXT NOT NULL,
                        value_int BIGINT,
                        value_float DOUBLE PRECISION,
                        value_str TEXT
                    )
                    "#
                ),
            ))
            .await?;

        self.db
            .execute(Statement::from_string(
                backend,
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{TABLE}_mac_field_time ON {TABLE} (device_mac, field, time_ms)"
                ),
            ))
            .await?;

        debug!(table = TABLE, "Point store schema ready");
        Ok(())
    }

    fn decode_row(row: &QueryResult) -> Result<PointRow> {
        let time_ms: i64 = row.try_get("", "time_ms")?;
        let time = Utc
            .timestamp_millis_opt(time_ms)
            .single()
            .ok_or_else(|| StoreError::CorruptRow(format!("timestamp out of range: {time_ms}")))?;

        let field: String = row.try_get("", "field")?;
        let value_int: Option<i64> = row.try_get("", "value_int")?;
        let value_float: Option<f64> = row.try_get("", "value_float")?;
        let value_str: Option<String> = row.try_get("", "value_str")?;

        let value = match (value_int, value_float, value_str) {
            (Some(v), _, _) => FieldValue::Integer(v),
            (None, Some(v), _) => FieldValue::Float(v),
            (None, None, Some(v)) => FieldValue::String(v),
            (None, None, None) => {
                return Err(StoreError::CorruptRow(format!("field {field} has no value")))
            }
        };

        Ok(PointRow {
            tags: Tags {
                device_mac: row.try_get("", "device_mac")?,
                device_type: row.try_get("", "device_type")?,
                device_category: row.try_get("", "device_category")?,
                gateway_id: row.try_get("", "gateway_id")?,
                group_id: row.try_get("", "group_id")?,
            },
            field,
            value,
            time,
        })
    }
}

/// 以 `$n` 占位符累积参数
#[derive(Default)]
struct Params {
    values: Vec<Value>,
}

impl Params {
    fn push(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }
}

fn where_clause(query: &PointQuery, prefix: &str, params: &mut Params) -> String {
    let mut clauses = vec![
        format!("{prefix}measurement = {}", params.push(query.measurement.clone())),
        format!("{prefix}time_ms >= {}", params.push(query.start.timestamp_millis())),
        format!("{prefix}time_ms < {}", params.push(query.stop.timestamp_millis())),
    ];

    if let Some(mac) = &query.device_mac {
        clauses.push(format!("{prefix}device_mac = {}", params.push(mac.clone())));
    }
    if let Some(field) = &query.field {
        clauses.push(format!("{prefix}field = {}", params.push(field.clone())));
    }
    for excluded in &query.exclude_fields {
        clauses.push(format!("{prefix}field <> {}", params.push(excluded.clone())));
    }

    clauses.join(" AND ")
}

fn point_values(point: &Point, field: &str, value: &FieldValue) -> [Value; 11] {
    let tags = point.tags();
    let (value_int, value_float, value_str) = match value {
        FieldValue::Integer(v) => (Some(*v), None, None),
        FieldValue::Float(v) => (None, Some(*v), None),
        FieldValue::String(v) => (None, None, Some(v.clone())),
    };

    [
        point.timestamp().timestamp_millis().into(),
        point.measurement().to_string().into(),
        tags.device_mac.clone().into(),
        tags.device_type.clone().into(),
        tags.device_category.clone().into(),
        tags.gateway_id.clone().into(),
        tags.group_id.clone().into(),
        field.to_string().into(),
        value_int.into(),
        value_float.into(),
        value_str.into(),
    ]
}

#[async_trait]
impl PointStore for SqlStore {
    async fn write_points(&self, points: &[Point]) -> Result<()> {
        let rows: Vec<[Value; 11]> = points
            .iter()
            .flat_map(|p| p.fields().iter().map(move |(f, v)| point_values(p, f, v)))
            .collect();

        if rows.is_empty() {
            return Ok(());
        }

        let backend = self.db.get_database_backend();
        let txn = self.db.begin().await?;

        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let mut params = Params::default();
            let tuples: Vec<String> = chunk
                .iter()
                .map(|values| {
                    let holders: Vec<String> =
                        values.iter().map(|v| params.push(v.clone())).collect();
                    format!("({})", holders.join(", "))
                })
                .collect();

            let sql = format!(
                "INSERT INTO {TABLE} ({}) VALUES {}",
                COLUMNS.join(", "),
                tuples.join(", ")
            );
            txn.execute(Statement::from_sql_and_values(backend, sql, params.values))
                .await?;
        }

        txn.commit().await?;

        debug!(
            points = points.len(),
            rows = rows.len(),
            "Points written to store"
        );

        Ok(())
    }

    async fn query(&self, query: &PointQuery) -> Result<Vec<PointRow>> {
        let mut params = Params::default();

        let sql = match query.selection {
            Selection::All => {
                let filter = where_clause(query, "", &mut params);
                format!(
                    "SELECT {} FROM {TABLE} WHERE {filter} ORDER BY time_ms ASC, field ASC, id ASC",
                    COLUMNS.join(", ")
                )
            }
            Selection::Last(group_by) => {
                let group: &[&str] = match group_by {
                    GroupBy::TagsAndField => &TAG_GROUP,
                    GroupBy::Field => &FIELD_GROUP,
                };
                let group_cols = group.join(", ");
                let join = group
                    .iter()
                    .map(|c| format!("r.{c} = latest.{c}"))
                    .collect::<Vec<_>>()
                    .join(" AND ");
                let selected = COLUMNS
                    .iter()
                    .map(|c| format!("r.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ");

                let inner = where_clause(query, "", &mut params);
                let outer = where_clause(query, "r.", &mut params);

                format!(
                    "SELECT {selected} FROM {TABLE} r \
                     INNER JOIN (SELECT {group_cols}, MAX(time_ms) AS max_time FROM {TABLE} WHERE {inner} GROUP BY {group_cols}) latest \
                     ON {join} AND r.time_ms = latest.max_time \
                     WHERE {outer} \
                     ORDER BY r.id ASC"
                )
            }
        };

        let stmt = Statement::from_sql_and_values(self.db.get_database_backend(), sql, params.values);
        let results = self.db.query_all(stmt).await?;

        let rows = results
            .iter()
            .map(Self::decode_row)
            .collect::<Result<Vec<_>>>()?;

        let rows = match query.selection {
            Selection::All => rows,
            Selection::Last(group_by) => select_last(rows, group_by),
        };

        debug!(count = rows.len(), "Queried point store");

        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn row(mac: &str, field: &str, value: i64, time: DateTime<Utc>) -> PointRow {
        PointRow {
            tags: Tags {
                device_mac: mac.to_string(),
                ..Tags::default()
            },
            field: field.to_string(),
            value: FieldValue::Integer(value),
            time,
        }
    }

    #[test]
    fn test_select_last_per_tags_and_field() {
        let t0 = Utc::now();
        let rows = vec![
            row("A", "humidity", 1, t0),
            row("A", "humidity", 2, t0 + Duration::seconds(5)),
            row("B", "humidity", 3, t0),
            row("A", "voltage", 4, t0 - Duration::seconds(5)),
        ];

        let last = select_last(rows, GroupBy::TagsAndField);
        assert_eq!(last.len(), 3);
        assert_eq!(last[0].field, "humidity");
        assert_eq!(last[0].value, FieldValue::Integer(2));
        assert_eq!(last[1].field, "voltage");
        assert_eq!(last[2].tags.device_mac, "B");
    }

    #[test]
    fn test_select_last_per_field() {
        let t0 = Utc::now();
        let rows = vec![
            row("A", "humidity", 1, t0),
            row("B", "humidity", 2, t0 + Duration::seconds(1)),
        ];

        let last = select_last(rows, GroupBy::Field);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].tags.device_mac, "B");
    }

    #[test]
    fn test_where_clause_numbering() {
        let query = PointQuery::all_time(Utc::now())
            .with_device("A")
            .excluding("signal_quality");
        let mut params = Params::default();

        let clause = where_clause(&query, "r.", &mut params);
        assert_eq!(
            clause,
            "r.measurement = $1 AND r.time_ms >= $2 AND r.time_ms < $3 AND r.device_mac = $4 AND r.field <> $5"
        );
        assert_eq!(params.values.len(), 5);
    }
}
