use crate::{AcaoRepository, Error, RepositoryError, Result, WorkerConfig};
use acoes_domain::{decode, validate, Acao};
use acoes_queue::{
    consume_with_handler, Connect, ExceptionReceived, HandleResult, QueuedMessage,
    QueuedMessageHandler,
};
use acoes_utils::Keeper;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Worker 的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// 未订阅
    Stopped,
    /// 正在打开订阅
    Starting,
    /// 正在消费
    Listening,
    /// 正在关闭订阅
    Stopping,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerState::Stopped => "stopped",
            WorkerState::Starting => "starting",
            WorkerState::Listening => "listening",
            WorkerState::Stopping => "stopping",
        })
    }
}

/// 单条消息的处理：解码、校验、写入
///
/// 结果只用于日志，消息总会被确认
pub struct AcaoHandler<R> {
    repository: R,
    config: WorkerConfig,
}

impl<R: AcaoRepository> AcaoHandler<R> {
    /// 构造
    pub fn new(repository: R, config: WorkerConfig) -> Self {
        Self { repository, config }
    }

    async fn save(&self, acao: &Acao) -> std::result::Result<(), RepositoryError> {
        let attempts = self.config.save_attempts();
        let mut attempt = 1;
        loop {
            match self.repository.save(acao).await {
                Ok(()) => return Ok(()),
                Err(error) if attempt < attempts => {
                    tracing::warn!(%error, attempt, attempts, codigo = %acao.codigo, "Failed to save acao, retrying");
                    tokio::time::sleep(self.config.save_retry_interval()).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[async_trait]
impl<R: AcaoRepository> QueuedMessageHandler for AcaoHandler<R> {
    async fn handle(&self, message: &QueuedMessage) -> HandleResult {
        let lock_token = message.lock_token();
        tracing::info!(%lock_token, payload = %String::from_utf8_lossy(message.body()), "Message received");

        let acao = match decode(message.body()) {
            Ok(acao) => acao,
            Err(error) => {
                tracing::error!(%error, %lock_token, "Invalid acao payload");
                return HandleResult::Failure(format!("invalid payload: {}", error).into());
            }
        };

        let validation = validate(&acao);
        if !validation.is_valid() {
            tracing::error!(errors = %validation, codigo = %acao.codigo, %lock_token, "Acao validation failed");
            return HandleResult::Failure(format!("validation failed: {}", validation).into());
        }

        // 全部重试失败后仍然确认：该记录不会再被投递，日志中保留完整内容
        if let Err(error) = self.save(&acao).await {
            tracing::error!(%error, ?acao, %lock_token, "Failed to save acao");
            return HandleResult::Failure(format!("persistence failed: {}", error).into());
        }

        tracing::info!(codigo = %acao.codigo, quantidade = acao.quantidade, preco = acao.preco, "Acao saved");
        HandleResult::Ok
    }

    async fn on_exception(&self, args: ExceptionReceived) {
        let ExceptionReceived {
            exception,
            context,
            action,
        } = args;

        tracing::error!(
            %exception,
            endpoint = %context.endpoint,
            entity_path = %context.entity_path,
            %action,
            "Message handler encountered an exception"
        );
    }
}

/// 消费管道
///
/// `start` 打开订阅并在后台逐条处理消息，`stop` 关闭订阅。
/// 订阅由后台任务独占，`Worker` 被丢弃时同样会关闭订阅。
pub struct Worker<C, R> {
    connector: C,
    handler: Arc<AcaoHandler<R>>,
    state: WorkerState,
    keeper: Option<Keeper<acoes_queue::error::Result<()>>>,
}

impl<C: Connect, R: AcaoRepository> Worker<C, R> {
    /// 构造，此时不连接消息队列
    pub fn new(connector: C, repository: R, config: WorkerConfig) -> Self {
        Self {
            connector,
            handler: Arc::new(AcaoHandler::new(repository, config)),
            state: WorkerState::Stopped,
            keeper: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// 打开订阅并开始消费，不等待消息到达
    ///
    /// 配置缺失或连接失败时返回错误，状态回到 `Stopped`
    pub async fn start(&mut self) -> Result<()> {
        self.expect_state(WorkerState::Stopped)?;
        self.state = WorkerState::Starting;

        let subscription = match self.connector.connect().await {
            Ok(subscription) => subscription,
            Err(error) => {
                self.state = WorkerState::Stopped;
                tracing::error!(%error, "Failed to open subscription");
                return Err(error.into());
            }
        };

        let context = subscription.context().clone();
        tracing::info!(endpoint = %context.endpoint, entity_path = %context.entity_path, "Subscription is open.");

        let handler = self.handler.clone();
        self.keeper = Some(Keeper::make(|waiter| {
            consume_with_handler(subscription, handler, async move {
                waiter.await.unwrap_or_default()
            })
        }));
        self.state = WorkerState::Listening;

        Ok(())
    }

    /// 停止消费并关闭订阅
    ///
    /// 正在处理的消息会处理完并确认后再返回
    pub async fn stop(&mut self) -> Result<()> {
        self.expect_state(WorkerState::Listening)?;
        self.state = WorkerState::Stopping;
        tracing::warn!("Stopping message processing!");

        let result = match self.keeper.take() {
            Some(keeper) => keeper.close().await,
            None => Ok(Ok(())),
        };
        self.state = WorkerState::Stopped;

        result??;
        tracing::info!("Subscription is closed.");
        Ok(())
    }

    fn expect_state(&self, expected: WorkerState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                actual: self.state,
                expected,
            })
        }
    }
}

#[cfg(test)]
mod test {
    use super::AcaoHandler;
    use crate::{AcaoRepository, RepositoryError, WorkerConfig};
    use acoes_domain::Acao;
    use acoes_queue::{HandleResult, LockToken, QueuedMessage, QueuedMessageHandler, SubscriptionContext};
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, PoisonError};
    use tokio::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    /// 前 `failures` 次写入失败
    #[derive(Default)]
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        saved: Mutex<Vec<Acao>>,
    }

    #[async_trait::async_trait]
    impl AcaoRepository for Flaky {
        async fn save(&self, acao: &Acao) -> Result<(), RepositoryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(RepositoryError::Other("connection refused".into()));
            }
            self.saved.lock().await.push(acao.clone());
            Ok(())
        }
    }

    fn message(body: &str) -> QueuedMessage {
        QueuedMessage::new(
            body.as_bytes().to_vec(),
            LockToken::new(),
            Arc::new(SubscriptionContext::new("memory://local", "acoes", "worker")),
        )
    }

    fn handler(failures: u32, save_attempts: u32) -> AcaoHandler<Flaky> {
        AcaoHandler::new(
            Flaky {
                failures,
                ..Default::default()
            },
            WorkerConfig {
                save_attempts,
                save_retry_interval_ms: 1,
            },
        )
    }

    #[tokio::test]
    async fn valid_payload_is_saved() {
        let handler = handler(0, 1);
        let result = handler
            .handle(&message(r#"{"codigo":"PETR4","quantidade":100,"preco":28.5}"#))
            .await;

        assert!(matches!(result, HandleResult::Ok));
        assert_eq!(*handler.repository.saved.lock().await, [Acao::new("PETR4", 100, 28.5)]);
    }

    #[tokio::test]
    async fn invalid_payload() {
        let handler = handler(0, 1);
        let result = handler.handle(&message("not-json")).await;

        assert!(matches!(result, HandleResult::Failure(reason) if reason.starts_with("invalid payload")));
        assert_eq!(handler.repository.calls.load(Ordering::SeqCst), 0);
    }

    /// 收集日志输出
    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let buffer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
            String::from_utf8_lossy(&buffer).lines().map(str::to_owned).collect()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn invalid_payload_is_logged() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        // 单线程运行时，整个测试都在当前线程上
        let _default = tracing::subscriber::set_default(subscriber);

        let handler = handler(0, 1);
        let result = handler.handle(&message("not-json")).await;
        assert!(matches!(result, HandleResult::Failure(_)));

        let lines = captured.lines();
        assert!(
            lines
                .iter()
                .any(|line| line.contains("ERROR") && line.contains("Invalid acao payload")),
            "{:?}",
            lines
        );
        assert!(!lines.iter().any(|line| line.contains("Acao saved")));
    }

    #[tokio::test]
    async fn validation_failure_lists_fields() {
        let handler = handler(0, 1);
        let result = handler
            .handle(&message(r#"{"codigo":"","quantidade":-5,"preco":0}"#))
            .await;

        match result {
            HandleResult::Failure(reason) => {
                assert!(reason.starts_with("validation failed"));
                for field in ["codigo", "quantidade", "preco"] {
                    assert!(reason.contains(field), "{} missing in {}", field, reason);
                }
            }
            HandleResult::Ok => panic!("invalid acao accepted"),
        }
        assert_eq!(handler.repository.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn persistence_failure() {
        let handler = handler(u32::MAX, 1);
        let result = handler
            .handle(&message(r#"{"codigo":"VALE3","quantidade":1,"preco":61.0}"#))
            .await;

        assert!(matches!(result, HandleResult::Failure(reason) if reason.starts_with("persistence failed")));
        assert_eq!(handler.repository.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_saved() {
        let handler = handler(2, 3);
        let result = handler
            .handle(&message(r#"{"codigo":"VALE3","quantidade":1,"preco":61.0}"#))
            .await;

        assert!(matches!(result, HandleResult::Ok));
        assert_eq!(handler.repository.calls.load(Ordering::SeqCst), 3);
        assert_eq!(handler.repository.saved.lock().await.len(), 1);
    }
}
