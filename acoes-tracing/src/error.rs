use thiserror::Error;

/// 日志初始化错误
#[derive(Debug, Error)]
pub enum Error {
    /// 创建日志目录或文件失败
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// 全局订阅者已被设置
    #[error(transparent)]
    Tracing(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 日志初始化结果
pub type Result<T> = std::result::Result<T, Error>;
