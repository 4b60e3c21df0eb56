use serde::{Deserialize, Serialize};

use crate::errors::{RelayError, Result};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// ENV 前缀与分隔符，例如 RELAY__SERVER__PORT=9000
pub const ENV_PREFIX: &str = "RELAY";
pub const ENV_SEPARATOR: &str = "__";

/// Plain port variable honoured after every other source
pub const PORT_ENV_VAR: &str = "PORT";

/// Cookie SameSite 策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
}

/// 静态配置（启动时加载）
///
/// 优先级：PORT > ENV (RELAY__*) > config.toml > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

impl StaticConfig {
    /// Load from a TOML file and `RELAY__*` environment variables.
    ///
    /// Without an explicit `path`, `config.toml` is optional. An explicit
    /// path that does not exist is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let (file, required) = match path {
            Some(p) => (p, true),
            None => (DEFAULT_CONFIG_PATH, false),
        };

        let settings = Config::builder()
            .add_source(File::with_name(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("proxy.trusted_proxies"),
            )
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if std::path::Path::new(file).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", file);
        }
        Ok(config)
    }

    /// Apply the plain `PORT` variable on top of everything else.
    ///
    /// Empty values are ignored; anything that is not a valid port is a
    /// configuration error.
    pub fn apply_port_override(&mut self, raw: Option<&str>) -> Result<()> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(());
        };

        self.server.port = raw
            .parse::<u16>()
            .map_err(|e| RelayError::config(format!("Invalid {} value '{}': {}", PORT_ENV_VAR, raw, e)))?;
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Graceful shutdown window in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Attributes attached to the `source` cookie and to its expiry.
///
/// The defaults produce a bare session cookie with no attributes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CookieConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub same_site: Option<SameSitePolicy>,
}

/// 反向代理配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProxyConfig {
    /// IPs or CIDRs whose forwarding headers are believed
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            workers: default_workers(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
