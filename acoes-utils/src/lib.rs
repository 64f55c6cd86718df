//! 工具函数库
//!

mod error;
pub mod secret;

pub use error::*;
use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 监听 SIGINT（Ctrl-C） / SIGTERM
///
/// 信号处理器安装失败时记录错误，该信号源不再触发
pub async fn shutdown_signal() {
    let sig_int = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sig_term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sig_term = std::future::pending::<()>();

    tokio::select! {
        _ = sig_int => tracing::info!("SIGINT received."),
        _ = sig_term => tracing::info!("SIGTERM received."),
    }
}

/// 持有一个可关闭的后台异步任务
///
/// 任务通过 `make` 传入的 `oneshot::Receiver` 感知关闭请求；
/// `Keeper` 被丢弃时发送端随之丢弃，任务同样会收到关闭通知。
///
/// # Example
///
/// ```no_run
/// use acoes_utils::Keeper;
/// use tokio::time::sleep;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let keeper = Keeper::make(|mut waiter| async move {
///         loop {
///             tokio::select! {
///                 _ = &mut waiter => {
///                     break;
///                 }
///                 _ = sleep(Duration::from_secs(1)) => {
///                     println!("tick");
///                 }
///             }
///         }
///
///         true
///     });
///
///     assert!(matches!(keeper.close().await, Ok(true)));
/// }
///
/// ```
///
pub struct Keeper<R> {
    closer: oneshot::Sender<()>,
    result_handle: JoinHandle<R>,
}

impl<R> Keeper<R>
where
    R: Send + 'static,
{
    /// 开始执行异步任务 `f` 并构造控制任务关闭的 `Keeper` 对象
    ///
    pub fn make<Fut, F>(f: F) -> Self
    where
        Fut: Future<Output = R> + Send + 'static,
        F: FnOnce(oneshot::Receiver<()>) -> Fut,
    {
        let (closer, waiter) = oneshot::channel();
        let result_handle = tokio::spawn(f(waiter));
        Self {
            closer,
            result_handle,
        }
    }

    /// 请求关闭异步任务，并等待其返回结果
    ///
    /// 任务已自行退出时直接取回其结果
    pub async fn close(self) -> Result<R> {
        let Keeper {
            closer,
            result_handle,
        } = self;

        if closer.send(()).is_err() {
            tracing::debug!("The task has already exited.");
        }

        Ok(result_handle.await?)
    }

    /// 任务是否已经退出（不再等待关闭请求）
    ///
    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }
}
