use crate::error::Result;
use crate::model::{Point, PointRow};
use crate::query::{PointQuery, Selection};
use crate::store::{select_last, PointStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// 内存存储实现
///
/// 与 `SqlStore` 语义一致，用于测试和演示
#[derive(Default)]
pub struct MemoryStore {
    points: RwLock<Vec<Point>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的点数量
    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    /// 已写入点的快照
    pub async fn points(&self) -> Vec<Point> {
        self.points.read().await.clone()
    }
}

#[async_trait]
impl PointStore for MemoryStore {
    async fn write_points(&self, points: &[Point]) -> Result<()> {
        self.points.write().await.extend_from_slice(points);
        Ok(())
    }

    async fn query(&self, query: &PointQuery) -> Result<Vec<PointRow>> {
        let points = self.points.read().await;

        let rows = points.iter().flat_map(|point| {
            point
                .rows()
                .filter(|row| query.matches(point.measurement(), row))
                .collect::<Vec<_>>()
        });

        Ok(match query.selection {
            Selection::All => {
                let mut rows: Vec<PointRow> = rows.collect();
                rows.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.field.cmp(&b.field)));
                rows
            }
            Selection::Last(group_by) => select_last(rows, group_by),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Tags, DEFAULT_MEASUREMENT};
    use crate::query::GroupBy;
    use chrono::{Duration, Utc};
    use flux_types::FieldValue;
    use std::collections::BTreeMap;

    fn point(mac: &str, offset_secs: i64, fields: &[(&str, FieldValue)]) -> Point {
        let tags = Tags {
            device_mac: mac.to_string(),
            ..Tags::default()
        };
        let fields: BTreeMap<String, FieldValue> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Point::new(
            DEFAULT_MEASUREMENT,
            tags,
            Utc::now() - Duration::hours(1) + Duration::seconds(offset_secs),
            fields,
        )
    }

    #[tokio::test]
    async fn test_all_rows_ascending() {
        let store = MemoryStore::new();
        store
            .write_points(&[
                point("A", 10, &[("humidity", FieldValue::Integer(9))]),
                point("A", 0, &[("humidity", FieldValue::Integer(8))]),
                point("B", 5, &[("humidity", FieldValue::Integer(1))]),
            ])
            .await
            .unwrap();

        let query = PointQuery::all_time(Utc::now())
            .with_device("A")
            .with_field("humidity");
        let rows = store.query(&query).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, FieldValue::Integer(8));
        assert_eq!(rows[1].value, FieldValue::Integer(9));
    }

    #[tokio::test]
    async fn test_last_excludes_fields() {
        let store = MemoryStore::new();
        store
            .write_points(&[
                point(
                    "A",
                    0,
                    &[
                        ("humidity", FieldValue::Integer(8)),
                        ("signal_quality", FieldValue::Integer(-70)),
                    ],
                ),
                point("A", 10, &[("humidity", FieldValue::Integer(9))]),
            ])
            .await
            .unwrap();

        let query = PointQuery::all_time(Utc::now())
            .excluding("signal_quality")
            .last(GroupBy::TagsAndField);
        let rows = store.query(&query).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, FieldValue::Integer(9));
    }

    #[tokio::test]
    async fn test_stop_is_exclusive() {
        let store = MemoryStore::new();
        let p = point("A", 0, &[("humidity", FieldValue::Integer(8))]);
        let ts = p.timestamp();
        store.write_points(&[p]).await.unwrap();

        let rows = store.query(&PointQuery::new(ts, ts)).await.unwrap();
        assert!(rows.is_empty());

        let rows = store
            .query(&PointQuery::new(ts, ts + Duration::milliseconds(1)))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
