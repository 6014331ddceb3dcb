pub mod device;
pub mod value;

pub use device::{DeviceCategory, ParseCategoryError};
pub use value::{FieldValue, ValueKind};
