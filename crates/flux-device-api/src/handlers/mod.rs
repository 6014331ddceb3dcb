pub mod device;
pub mod history;

pub use device::*;
pub use history::*;
