//! Route paths, parameter names and fixed response bodies

pub const GOTO_PATH: &str = "/goto";
pub const RETURN_PATH: &str = "/return";

/// Query parameter carrying the destination
pub const TARGET_PARAM: &str = "target";
/// Query parameter carrying the origin; also the cookie name
pub const SOURCE_PARAM: &str = "source";

pub const SOURCE_COOKIE_NAME: &str = "source";

pub const MISSING_COOKIE_MESSAGE: &str = "Missing source cookie";

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
