//! # Queue
//!
//! 订阅消息队列，逐条处理消息并确认（complete）
//!
//! 支持 Kafka、Pulsar 以及进程内的 [`memory::MemoryBroker`]

use crate::error::Result;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub mod config;
pub mod error;
pub mod kafka;
pub mod memory;
pub mod pulsar;
mod pump;

pub use pump::consume_with_handler;

/// 对消费到的消息进行处理得到的结果
///
/// 无论结果如何，消息都会被确认
#[derive(Debug)]
pub enum HandleResult {
    /// 处理成功
    Ok,

    /// 处理失败，消息不会重投
    Failure(Cow<'static, str>),
}

/// 消息锁令牌，每次投递生成一个，用于确认该次投递
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockToken(Uuid);

impl LockToken {
    /// 生成新的令牌
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LockToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 订阅的诊断信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionContext {
    /// 服务端地址
    pub endpoint: String,
    /// 实体路径 `<topic>/subscriptions/<subscription>`
    pub entity_path: String,
}

impl SubscriptionContext {
    /// 构造
    pub fn new(endpoint: impl Into<String>, topic: &str, subscription: &str) -> Self {
        Self {
            endpoint: endpoint.into(),
            entity_path: format!("{}/subscriptions/{}", topic, subscription),
        }
    }
}

/// 一次投递的消息
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    body: Vec<u8>,
    lock_token: LockToken,
    context: Arc<SubscriptionContext>,
}

impl QueuedMessage {
    /// 构造
    pub fn new(body: Vec<u8>, lock_token: LockToken, context: Arc<SubscriptionContext>) -> Self {
        Self {
            body,
            lock_token,
            context,
        }
    }

    /// 消息体
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// 锁令牌
    pub fn lock_token(&self) -> LockToken {
        self.lock_token
    }

    /// 投递来源
    pub fn context(&self) -> &SubscriptionContext {
        &self.context
    }
}

/// 发生异常时正在执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 接收消息
    Receive,
    /// 确认消息
    Complete,
    /// 关闭订阅
    Close,
    /// 执行消息处理器
    UserCallback,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Receive => "Receive",
            Action::Complete => "Complete",
            Action::Close => "Close",
            Action::UserCallback => "UserCallback",
        })
    }
}

/// 消息队列层面的异常，与消息处理分开投递给 [`QueuedMessageHandler::on_exception`]
#[derive(Debug)]
pub struct ExceptionReceived {
    /// 异常
    pub exception: error::Error,
    /// 订阅信息
    pub context: Arc<SubscriptionContext>,
    /// 发生异常时的动作
    pub action: Action,
}

/// 消息处理器
#[async_trait::async_trait]
pub trait QueuedMessageHandler: Send + Sync + 'static {
    /// 处理一条消息，返回后消息即被确认
    async fn handle(&self, message: &QueuedMessage) -> HandleResult;

    /// 接收队列层面的异常，仅用于记录，恢复由客户端自行完成
    async fn on_exception(&self, args: ExceptionReceived);
}

/// 一个已打开的订阅
///
/// 同一时间只有一个调用者持有订阅
#[async_trait::async_trait]
pub trait Subscription: Send {
    /// 诊断信息
    fn context(&self) -> &Arc<SubscriptionContext>;

    /// 接收下一条消息，订阅结束时返回 `None`
    async fn receive(&mut self) -> Option<Result<QueuedMessage>>;

    /// 确认消息，此后不会再投递
    async fn complete(&mut self, lock_token: LockToken) -> Result<()>;

    /// 关闭订阅，释放服务端资源
    async fn close(&mut self) -> Result<()>;
}

/// 根据订阅目标打开订阅
#[async_trait::async_trait]
pub trait Connect: Send + Sync + 'static {
    /// 打开订阅，配置缺失或连接失败时返回错误
    async fn connect(&self) -> Result<Box<dyn Subscription>>;
}
