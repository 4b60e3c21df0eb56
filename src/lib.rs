//! relaylink - a minimal redirect relay
//!
//! `/goto?target=..&source=..` stores the origin in a `source` cookie and
//! answers with a 303 to the target. `/return` answers with a 303 back to
//! the stored origin and expires the cookie.
//!
//! # Architecture
//! - `api`: relay handlers, cookie construction and middleware
//! - `utils`: URL parameter validation and client address resolution
//! - `config`: startup configuration (file, environment, `PORT`)
//! - `system`: logging setup
//! - `runtime`: HTTP server construction

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod system;
pub mod utils;
