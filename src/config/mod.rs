mod structs;

pub use structs::*;

use crate::errors::Result;

/// Load the startup configuration: file, then `RELAY__*` variables, then
/// the plain `PORT` variable.
///
/// The result is handed to the server explicitly; nothing is stored in a
/// global.
///
/// # Examples
/// ```no_run
/// use relaylink::config::init_config;
/// let config = init_config(None).expect("invalid configuration");
/// assert!(config.server.port > 0);
/// ```
pub fn init_config(path: Option<&str>) -> Result<StaticConfig> {
    let mut config = StaticConfig::load(path)?;
    config.apply_port_override(std::env::var(PORT_ENV_VAR).ok().as_deref())?;
    Ok(config)
}
