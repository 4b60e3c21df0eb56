pub mod access_log;
pub mod request_context;

pub use access_log::AccessLog;
pub use request_context::{ClientAddr, RequestContextMiddleware, RequestId};
