pub mod capture;
pub mod create;
pub mod list;
pub mod picker;
pub mod session;

pub use capture::{CaptureController, CaptureState};
pub use create::CreateFlow;
pub use list::ListController;
pub use picker::{FilePicker, ImagePicker, PickError};
pub use session::DetailSession;
