use crate::builder::{PointBuilder, RawRecord};
use crate::error::{IngestError, RecordError, Result};
use flux_timeseries::{Point, PointStore, PointWriter, DEFAULT_BATCH_SIZE};
use flux_types::{DeviceCategory, ValueKind};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 单个文件的导入结果
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub category: DeviceCategory,
    pub device_type: String,
    pub path: PathBuf,
    pub points: u64,
}

/// 一次导入的汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub files: Vec<FileReport>,
    pub missing_folders: Vec<PathBuf>,
    pub total_points: u64,
}

impl ImportSummary {
    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}

/// 字段类型漂移检测：同一字段首次出现的类型与之后不一致时告警一次
#[derive(Debug, Default)]
pub struct DriftMonitor {
    kinds: HashMap<String, ValueKind>,
    reported: HashMap<String, ValueKind>,
}

impl DriftMonitor {
    /// 记录一个点的字段类型，返回本次新发现漂移的字段
    pub fn observe(&mut self, point: &Point) -> Vec<String> {
        let mut drifted = Vec::new();
        for (field, value) in point.fields() {
            let kind = value.kind();
            let first = *self.kinds.entry(field.clone()).or_insert(kind);
            if first != kind && !self.reported.contains_key(field) {
                warn!(
                    field = %field,
                    first = %first,
                    observed = %kind,
                    device_mac = %point.tags().device_mac,
                    "Field type drift detected"
                );
                self.reported.insert(field.clone(), kind);
                drifted.push(field.clone());
            }
        }
        drifted
    }

    /// 已发现漂移的字段
    pub fn drifted_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self.reported.keys().map(String::as_str).collect();
        fields.sort_unstable();
        fields
    }
}

/// 数据导入器
///
/// 目录结构：`<data_dir>/gateways/*.json` 与 `<data_dir>/sensors/*.json`，
/// 每个文件是一个设备类型的记录数组，文件名（去掉扩展名）即设备类型
pub struct Importer {
    store: Arc<dyn PointStore>,
    data_dir: PathBuf,
    batch_size: usize,
}

impl Importer {
    pub fn new(store: Arc<dyn PointStore>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// 执行导入
    ///
    /// 无论成功失败都会提交并关闭写入器；写入错误视为导入失败
    pub async fn run(&self) -> Result<ImportSummary> {
        info!(data_dir = %self.data_dir.display(), "Starting data import");

        let mut writer = PointWriter::new(self.store.clone(), self.batch_size);
        let result = self.import_all(&mut writer).await;

        info!("Flushing data to store");
        let closed = writer.close().await;

        match (result, closed) {
            (Ok(summary), Ok(written)) => {
                info!(
                    files = summary.total_files(),
                    points = summary.total_points,
                    written,
                    "Import complete"
                );
                Ok(summary)
            }
            (Err(e), closed) => {
                if let Err(flush_err) = closed {
                    error!(error = %flush_err, "Flush after failed import also failed");
                }
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e.into()),
        }
    }

    async fn import_all(&self, writer: &mut PointWriter) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let mut drift = DriftMonitor::default();

        for category in DeviceCategory::ALL {
            let folder = self.data_dir.join(category.folder());

            if !tokio::fs::try_exists(&folder).await.unwrap_or(false) {
                warn!(folder = %folder.display(), "Folder not found, skipping");
                summary.missing_folders.push(folder);
                continue;
            }

            let files = list_json_files(&folder).await?;
            info!(folder = %category.folder(), files = files.len(), "Processing folder");

            for path in files {
                let report = self.import_file(&path, category, writer, &mut drift).await?;
                info!(
                    file = %path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                    points = report.points,
                    "File imported"
                );
                summary.total_points += report.points;
                summary.files.push(report);
            }
        }

        Ok(summary)
    }

    async fn import_file(
        &self,
        path: &Path,
        category: DeviceCategory,
        writer: &mut PointWriter,
        drift: &mut DriftMonitor,
    ) -> Result<FileReport> {
        let device_type = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let records: Vec<Value> =
            serde_json::from_str(&content).map_err(|source| IngestError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let builder = PointBuilder::new(device_type.clone(), category);
        let mut points = 0u64;

        for (index, record) in records.into_iter().enumerate() {
            let record: RawRecord = match record {
                Value::Object(map) => map,
                _ => {
                    return Err(IngestError::Record {
                        path: path.to_path_buf(),
                        index,
                        source: RecordError::NotAnObject,
                    })
                }
            };

            let point = builder.build(&record).map_err(|source| IngestError::Record {
                path: path.to_path_buf(),
                index,
                source,
            })?;

            drift.observe(&point);
            writer.write(point).await?;
            points += 1;
        }

        Ok(FileReport {
            category,
            device_type,
            path: path.to_path_buf(),
            points,
        })
    }
}

/// 列出目录下的 `.json` 文件，按文件名排序
async fn list_json_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| IngestError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(folder).await.map_err(io_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_json = path.extension().map_or(false, |ext| ext == "json");
        if is_json && entry.file_type().await.map_err(io_err)?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
