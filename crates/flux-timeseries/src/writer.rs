use crate::error::Result;
use crate::model::Point;
use crate::store::PointStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// 默认批量大小
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// 缓冲写入器
///
/// 缓冲区满时自动提交；`close` 会提交剩余的点并返回写入总数
pub struct PointWriter {
    store: Arc<dyn PointStore>,
    buffer: Vec<Point>,
    batch_size: usize,
    written: u64,
}

impl PointWriter {
    pub fn new(store: Arc<dyn PointStore>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            store,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            written: 0,
        }
    }

    /// 写入一个点（所有权转交给写入器）
    pub async fn write(&mut self, point: Point) -> Result<()> {
        self.buffer.push(point);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// 提交缓冲区中的所有点
    pub async fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.store.write_points(&self.buffer).await?;
        self.written += self.buffer.len() as u64;

        debug!(
            batch = self.buffer.len(),
            written = self.written,
            "Flushed points"
        );

        self.buffer.clear();
        Ok(())
    }

    /// 缓冲中尚未提交的点数
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// 已确认写入的点数
    pub fn written(&self) -> u64 {
        self.written
    }

    /// 提交剩余数据并关闭写入器
    pub async fn close(mut self) -> Result<u64> {
        self.flush().await?;
        Ok(self.written)
    }
}

impl Drop for PointWriter {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                pending = self.buffer.len(),
                "Point writer dropped with unflushed points"
            );
        }
    }
}
