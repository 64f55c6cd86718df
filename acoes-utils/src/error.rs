use std::borrow::Cow;

/// 后台任务相关错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 任务 panic 或被取消
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// 其他错误
    #[error("{0}")]
    Other(Cow<'static, str>),
}

/// 结果
pub type Result<T> = std::result::Result<T, Error>;
