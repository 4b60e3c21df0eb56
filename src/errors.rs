use std::fmt;

/// Process-level errors: anything that stops the relay from starting.
///
/// Request-level failures never reach this type; they are answered with a
/// 400 by the handlers themselves.
#[derive(Debug, Clone)]
pub enum RelayError {
    Config(String),
    Logging(String),
    FileOperation(String),
    Serialization(String),
    ServerBind(String),
}

impl RelayError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "E001",
            RelayError::Logging(_) => "E002",
            RelayError::FileOperation(_) => "E003",
            RelayError::Serialization(_) => "E004",
            RelayError::ServerBind(_) => "E005",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "Configuration Error",
            RelayError::Logging(_) => "Logging Setup Error",
            RelayError::FileOperation(_) => "File Operation Error",
            RelayError::Serialization(_) => "Serialization Error",
            RelayError::ServerBind(_) => "Server Bind Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            RelayError::Config(msg)
            | RelayError::Logging(msg)
            | RelayError::FileOperation(msg)
            | RelayError::Serialization(msg)
            | RelayError::ServerBind(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for RelayError {}

// 便捷的构造函数
impl RelayError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        RelayError::Config(msg.into())
    }

    pub fn logging<T: Into<String>>(msg: T) -> Self {
        RelayError::Logging(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        RelayError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RelayError::Serialization(msg.into())
    }

    pub fn server_bind<T: Into<String>>(msg: T) -> Self {
        RelayError::ServerBind(msg.into())
    }
}

impl From<config::ConfigError> for RelayError {
    fn from(err: config::ConfigError) -> Self {
        RelayError::Config(err.to_string())
    }
}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::FileOperation(err.to_string())
    }
}

impl From<toml::ser::Error> for RelayError {
    fn from(err: toml::ser::Error) -> Self {
        RelayError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            RelayError::config("a"),
            RelayError::logging("b"),
            RelayError::file_operation("c"),
            RelayError::serialization("d"),
            RelayError::server_bind("e"),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_uses_simple_format() {
        let err = RelayError::config("Invalid PORT value: abc");
        assert_eq!(
            err.to_string(),
            "Configuration Error: Invalid PORT value: abc"
        );
        assert_eq!(err.message(), "Invalid PORT value: abc");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RelayError = io.into();
        assert_eq!(err.code(), "E003");
    }
}
