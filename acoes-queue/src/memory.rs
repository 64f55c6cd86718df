//! 进程内消息队列
//!
//! 与 Kafka、Pulsar 订阅实现相同的 [`Subscription`] 约定，用于测试与本地运行。
//! 同一时刻只允许一个订阅；订阅关闭后可重新连接，未被接收的消息保留在队列中。

use crate::error::{require, Error, Result};
use crate::{Connect, LockToken, QueuedMessage, Subscription, SubscriptionContext};
use std::collections::HashSet;
use std::sync::{Arc, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch, Mutex, OwnedMutexGuard};

const ENDPOINT: &str = "memory://local";

enum Delivery {
    Message(Vec<u8>),
    Fault(String),
}

#[derive(Default)]
struct Stats {
    delivered: Vec<Vec<u8>>,
    completed: Vec<LockToken>,
    closed: usize,
}

struct Shared {
    sender: mpsc::UnboundedSender<Delivery>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Delivery>>>,
    /// 持锁期间不会 await，`receive` 取出消息后不再让出执行权
    stats: std::sync::Mutex<Stats>,
    completed: watch::Sender<usize>,
    completed_watcher: watch::Receiver<usize>,
}

impl Shared {
    fn stats(&self) -> MutexGuard<'_, Stats> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 进程内消息队列，克隆后共享同一队列
#[derive(Clone)]
pub struct MemoryBroker {
    topic: String,
    subscription: String,
    shared: Arc<Shared>,
}

impl MemoryBroker {
    /// 构造一个主题及其订阅
    pub fn new(topic: impl Into<String>, subscription: impl Into<String>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (completed, completed_watcher) = watch::channel(0);
        Self {
            topic: topic.into(),
            subscription: subscription.into(),
            shared: Arc::new(Shared {
                sender,
                receiver: Arc::new(Mutex::new(receiver)),
                stats: std::sync::Mutex::new(Stats::default()),
                completed,
                completed_watcher,
            }),
        }
    }

    /// 发布一条消息
    pub fn publish(&self, body: impl Into<Vec<u8>>) {
        self.send(Delivery::Message(body.into()));
    }

    /// 让订阅者在接收时得到一次队列层面的错误
    pub fn fault(&self, reason: impl Into<String>) {
        self.send(Delivery::Fault(reason.into()));
    }

    fn send(&self, delivery: Delivery) {
        // 接收端由 `Shared` 持有，发送不会失败
        if self.shared.sender.send(delivery).is_err() {
            tracing::warn!(topic = %self.topic, "Memory queue is closed.");
        }
    }

    /// 按接收顺序列出已投递的消息体
    pub async fn delivered(&self) -> Vec<Vec<u8>> {
        self.shared.stats().delivered.clone()
    }

    /// 已确认的消息数
    pub async fn completed_count(&self) -> usize {
        self.shared.stats().completed.len()
    }

    /// 订阅被关闭的次数
    pub async fn close_count(&self) -> usize {
        self.shared.stats().closed
    }

    /// 等待确认数达到 `count`
    pub async fn wait_completed(&self, count: usize) {
        let mut watcher = self.shared.completed_watcher.clone();
        while *watcher.borrow() < count {
            if watcher.changed().await.is_err() {
                break;
            }
        }
    }
}

#[async_trait::async_trait]
impl Connect for MemoryBroker {
    async fn connect(&self) -> Result<Box<dyn Subscription>> {
        require("memory.topic", &self.topic)?;
        require("memory.subscription", &self.subscription)?;

        let receiver = self
            .shared
            .receiver
            .clone()
            .try_lock_owned()
            .map_err(|_| Error::Unavailable("Subscription is already open.".into()))?;

        tracing::info!(topic = %self.topic, subscription = %self.subscription, "Topic is subscribed.");

        Ok(Box::new(MemorySubscription {
            context: Arc::new(SubscriptionContext::new(
                ENDPOINT,
                &self.topic,
                &self.subscription,
            )),
            receiver: Some(receiver),
            pending: HashSet::new(),
            shared: self.shared.clone(),
        }))
    }
}

struct MemorySubscription {
    context: Arc<SubscriptionContext>,
    /// 关闭后为 `None`，释放后允许重新订阅
    receiver: Option<OwnedMutexGuard<mpsc::UnboundedReceiver<Delivery>>>,
    pending: HashSet<LockToken>,
    shared: Arc<Shared>,
}

#[async_trait::async_trait]
impl Subscription for MemorySubscription {
    fn context(&self) -> &Arc<SubscriptionContext> {
        &self.context
    }

    async fn receive(&mut self) -> Option<Result<QueuedMessage>> {
        let delivery = self.receiver.as_mut()?.recv().await?;
        match delivery {
            Delivery::Fault(reason) => Some(Err(Error::Unavailable(reason.into()))),
            Delivery::Message(body) => {
                let lock_token = LockToken::new();
                self.pending.insert(lock_token);
                self.shared.stats().delivered.push(body.clone());
                Some(Ok(QueuedMessage::new(body, lock_token, self.context.clone())))
            }
        }
    }

    async fn complete(&mut self, lock_token: LockToken) -> Result<()> {
        if !self.pending.remove(&lock_token) {
            return Err(Error::LockLost(lock_token));
        }

        let completed = {
            let mut stats = self.shared.stats();
            stats.completed.push(lock_token);
            stats.completed.len()
        };
        self.shared.completed.send(completed).unwrap_or_default();
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.receiver = None;
        self.pending.clear();
        self.shared.stats().closed += 1;
        tracing::info!(entity_path = %self.context.entity_path, "Topic is unsubscribed.");
        Ok(())
    }
}
