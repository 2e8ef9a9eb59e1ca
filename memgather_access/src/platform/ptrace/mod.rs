pub mod attach;

pub use attach::{PtraceAttachError, PtraceAttachment, PtraceDetachError};
