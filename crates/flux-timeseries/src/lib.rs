pub mod error;
pub mod memory;
pub mod model;
pub mod query;
pub mod store;
pub mod writer;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use model::{Point, PointRow, Tags, DEFAULT_MEASUREMENT, UNKNOWN_TAG};
pub use query::{GroupBy, PointQuery, Selection, TimeBound};
pub use store::{select_last, PointStore, SqlStore};
pub use writer::{PointWriter, DEFAULT_BATCH_SIZE};
