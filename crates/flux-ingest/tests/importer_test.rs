use async_trait::async_trait;
use flux_ingest::{IngestError, Importer, RecordError};
use flux_timeseries::{
    MemoryStore, Point, PointQuery, PointRow, PointStore, Result as StoreResult, StoreError,
};
use flux_types::{DeviceCategory, FieldValue};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

/// 写入总是失败的存储
struct FailingStore;

#[async_trait]
impl PointStore for FailingStore {
    async fn write_points(&self, _points: &[Point]) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn query(&self, _query: &PointQuery) -> StoreResult<Vec<PointRow>> {
        Ok(Vec::new())
    }
}

fn write_json(dir: &Path, folder: &str, file: &str, value: serde_json::Value) {
    let folder = dir.join(folder);
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join(file), serde_json::to_string(&value).unwrap()).unwrap();
}

fn sensor_records(n: usize) -> serde_json::Value {
    let records: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "time": format!("2026-02-09 22:04:{:02}.521000000", i),
                "measure_name": "AA:BB:CC:DD:EE:01",
                "GatewayID": "GW1",
                "GroupID": "G1",
                "Temperature_CHIP-0.1°C": 220 + i,
                "Humidity-RH%": 8
            })
        })
        .collect();
    serde_json::Value::Array(records)
}

/// 测试 N 条记录写入 N 个点
#[tokio::test]
async fn test_import_counts_points() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "sensors", "AT-105.json", sensor_records(5));
    write_json(
        dir.path(),
        "gateways",
        "GTW-100.json",
        json!([{
            "time": "2026-02-09 22:00:00.000000000",
            "measure_name": "GW:01",
            "Voltage-mV": 3025
        }]),
    );
    fs::write(dir.path().join("sensors").join("notes.txt"), "ignored").unwrap();

    let store = Arc::new(MemoryStore::new());
    let importer = Importer::new(store.clone(), dir.path()).with_batch_size(2);
    let summary = importer.run().await.unwrap();

    assert_eq!(summary.total_files(), 2);
    assert_eq!(summary.total_points, 6);
    assert!(summary.missing_folders.is_empty());
    assert_eq!(summary.files[0].category, DeviceCategory::Gateway);
    assert_eq!(summary.files[0].device_type, "GTW-100");
    assert_eq!(summary.files[1].device_type, "AT-105");
    assert_eq!(summary.files[1].points, 5);
    assert_eq!(store.len().await, 6);

    let points = store.points().await;
    let sensor = points
        .iter()
        .find(|p| p.tags().device_mac == "AA:BB:CC:DD:EE:01")
        .unwrap();
    assert_eq!(sensor.tags().device_type, "AT-105");
    assert_eq!(sensor.tags().device_category, "sensor");
    assert_eq!(sensor.field("humidity"), Some(&FieldValue::Integer(8)));
}

/// 测试缺失目录被跳过
#[tokio::test]
async fn test_missing_folder_skipped() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "sensors", "AT-105.json", sensor_records(3));

    let store = Arc::new(MemoryStore::new());
    let summary = Importer::new(store.clone(), dir.path()).run().await.unwrap();

    assert_eq!(summary.missing_folders, vec![dir.path().join("gateways")]);
    assert_eq!(summary.total_points, 3);
    assert_eq!(store.len().await, 3);
}

/// 测试错误时间戳导致整次导入失败，已缓冲的点仍被提交
#[tokio::test]
async fn test_malformed_timestamp_fails_run() {
    let dir = tempdir().unwrap();
    write_json(
        dir.path(),
        "sensors",
        "AT-105.json",
        json!([
            {"time": "2026-02-09 22:04:45.521000000", "measure_name": "AA", "Humidity-RH%": 8},
            {"measure_name": "AA", "Humidity-RH%": 9}
        ]),
    );

    let store = Arc::new(MemoryStore::new());
    let err = Importer::new(store.clone(), dir.path()).run().await.unwrap_err();

    match err {
        IngestError::Record { index, source, .. } => {
            assert_eq!(index, 1);
            assert!(matches!(source, RecordError::MissingTimestamp));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.len().await, 1);
}

/// 测试非数组文件报错
#[tokio::test]
async fn test_invalid_json_fails_run() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "gateways", "GTW-100.json", json!({"not": "an array"}));

    let store = Arc::new(MemoryStore::new());
    let err = Importer::new(store, dir.path()).run().await.unwrap_err();
    assert!(matches!(err, IngestError::Json { .. }));
}

/// 测试存储写入失败时导入失败
#[tokio::test]
async fn test_store_failure_fails_run() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "sensors", "AT-105.json", sensor_records(2));

    let err = Importer::new(Arc::new(FailingStore), dir.path())
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
}

/// 测试导入后可以按设备查询
#[tokio::test]
async fn test_imported_points_queryable() {
    let dir = tempdir().unwrap();
    write_json(dir.path(), "sensors", "AT-105.json", sensor_records(4));

    let store = Arc::new(MemoryStore::new());
    Importer::new(store.clone(), dir.path()).run().await.unwrap();

    let rows = store
        .query(
            &PointQuery::all_time(chrono::Utc::now())
                .with_device("AA:BB:CC:DD:EE:01")
                .with_field("temperature_chip"),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].value, FieldValue::Integer(223));
}
