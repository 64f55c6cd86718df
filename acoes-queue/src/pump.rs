use crate::error::{Error, Result};
use crate::{Action, ExceptionReceived, HandleResult, QueuedMessageHandler, Subscription, SubscriptionContext};
use futures::FutureExt;
use std::any::Any;
use std::borrow::Cow;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 使用给定的消息处理器消费订阅
///
/// 单消费者循环：接收一条消息，等待处理器返回，确认该消息，再接收下一条，
/// 因此同一时刻至多一条消息在处理中，处理顺序即投递顺序。
///
/// 处理结果不影响确认：处理失败、处理器 panic 的消息同样会被确认。
/// 队列层面的异常通过独立的任务交给 [`QueuedMessageHandler::on_exception`]。
///
/// `signal` 只在等待下一条消息时生效，正在处理的消息会完成处理和确认后再退出。
/// 退出前关闭订阅，关闭失败时返回错误。
pub async fn consume_with_handler<H, F>(
    mut subscription: Box<dyn Subscription>,
    handler: Arc<H>,
    signal: F,
) -> Result<()>
where
    H: QueuedMessageHandler,
    F: Future<Output = ()> + Send,
{
    let context = subscription.context().clone();
    let (exceptions, mut received) = mpsc::unbounded_channel::<ExceptionReceived>();

    let exception_handler = handler.clone();
    let exception_task = tokio::spawn(async move {
        while let Some(args) = received.recv().await {
            exception_handler.on_exception(args).await;
        }
    });

    let report = |exception: Error, action: Action| {
        let args = ExceptionReceived {
            exception,
            context: context.clone(),
            action,
        };
        if let Err(e) = exceptions.send(args) {
            tracing::error!(exception = %e.0.exception, %action, "Exception handler is gone");
        }
    };

    let mut signal = Box::pin(signal);

    tracing::info!(entity_path = %context.entity_path, "Waiting for messages...");

    loop {
        // 关闭请求优先于已就绪的消息
        tokio::select! {
            biased;

            _ = &mut signal => {
                tracing::info!(entity_path = %context.entity_path, "Shutdown requested.");
                break;
            }
            option = subscription.receive() => {
                let message = match option {
                    Some(Ok(message)) => message,
                    Some(Err(error)) => {
                        report(error, Action::Receive);
                        continue;
                    }
                    None => {
                        tracing::warn!(entity_path = %context.entity_path, "Subscription stream is closed.");
                        break;
                    }
                };

                let lock_token = message.lock_token();

                match AssertUnwindSafe(handler.handle(&message)).catch_unwind().await {
                    Ok(HandleResult::Ok) => {
                        tracing::debug!(%lock_token, "Message processed");
                    }
                    Ok(HandleResult::Failure(error)) => {
                        tracing::warn!(%error, %lock_token, "Failed to process message");
                    }
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        tracing::error!(%reason, %lock_token, "Message handler panicked");
                        report(Error::HandlerPanicked(reason), Action::UserCallback);
                    }
                }

                if let Err(error) = subscription.complete(lock_token).await {
                    report(error, Action::Complete);
                }
            }
        }
    }

    let closed = subscription.close().await;

    drop(exceptions);
    if let Err(error) = exception_task.await {
        tracing::error!(%error, "Exception handler task failed");
    }

    closed
}

fn panic_message(panic: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        Cow::Borrowed(s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        Cow::Owned(s.clone())
    } else {
        Cow::Borrowed("unknown panic payload")
    }
}
