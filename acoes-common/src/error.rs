/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O 错误
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// 配置文件或环境变量不合法、缺少必填项
    #[error("Invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

/// 配置加载结果
pub type Result<T> = std::result::Result<T, Error>;
