pub mod engine;
pub mod result_log;

pub use engine::{ScanEngine, IMAGE_FIELD};
pub use result_log::ResultLog;
