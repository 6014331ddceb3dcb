pub mod builder;
pub mod error;
pub mod importer;
pub mod normalize;

pub use builder::{parse_timestamp, PointBuilder, RawRecord, SIGNAL_QUALITY_FIELD};
pub use error::{IngestError, RecordError, Result};
pub use importer::{DriftMonitor, FileReport, ImportSummary, Importer};
pub use normalize::{classify_number, clean_field_name, flatten_field};
