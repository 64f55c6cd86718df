use crate::WorkerState;

/// Worker 生命周期错误
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 当前状态不允许该操作
    #[error("Worker is {actual}, expected {expected}")]
    InvalidState {
        /// 当前状态
        actual: WorkerState,
        /// 操作要求的状态
        expected: WorkerState,
    },
    /// 打开或关闭订阅失败
    #[error(transparent)]
    Queue(#[from] acoes_queue::error::Error),
    /// 消费任务异常退出
    #[error(transparent)]
    Task(#[from] acoes_utils::Error),
}

/// Worker 生命周期结果
pub type Result<T> = std::result::Result<T, Error>;
