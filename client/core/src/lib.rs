pub mod error;
pub mod event;
pub mod types;

pub use error::{ScanError, TransportError, ValidationError, WorkflowError};
pub use event::{Notice, NoticeKind, UiEvent};
pub use types::{CapturedImage, Pipeline, ScanResult};
