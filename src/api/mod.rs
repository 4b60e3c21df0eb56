//! HTTP surface: relay handlers, cookie construction and middleware

pub mod constants;
pub mod cookie;
pub mod middleware;
pub mod services;
