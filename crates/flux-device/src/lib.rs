pub mod aggregator;
pub mod display;
pub mod error;
pub mod history;
pub mod model;

pub use aggregator::{fold_devices, sort_devices, DeviceAggregator, LIST_EXCLUDED_FIELDS};
pub use display::{
    display_field, format_field_name, format_field_value, format_timestamp, time_ago,
    DisplayField,
};
pub use error::{DeviceError, Result};
pub use history::HistoryReader;
pub use model::{Device, HistorySample};
