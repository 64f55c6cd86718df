use crate::error::{Error, Result};
use crate::kafka::KafkaConsumerConfig;
use crate::{LockToken, QueuedMessage, Subscription, SubscriptionContext};
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message as _, Offset, TopicPartitionList};
use std::collections::HashMap;
use std::sync::Arc;

/// 已投递未确认的消息位置
struct Position {
    topic: String,
    partition: i32,
    offset: i64,
}

pub struct KafkaConsumer {
    context: Arc<SubscriptionContext>,
    consumer: StreamConsumer,
    pending: HashMap<LockToken, Position>,
}

impl KafkaConsumer {
    pub async fn new(config: &KafkaConsumerConfig) -> Result<Self> {
        config.check()?;

        let mut client = ClientConfig::new();
        for (key, value) in &config.extension.properties {
            client.set(key, value);
        }

        let consumer: StreamConsumer = client
            .set("group.id", &config.extension.group_id)
            .set("bootstrap.servers", &config.servers)
            .set("enable.partition.eof", "false")
            .set("auto.offset.reset", &config.extension.auto_offset_reset)
            .set(
                "session.timeout.ms",
                config.extension.session_timeout_ms.to_string(),
            )
            .set("enable.auto.commit", "false")
            .create()?;

        consumer.subscribe(&[&config.topic])?;

        let context = SubscriptionContext::new(
            config.servers.as_str(),
            &config.topic,
            &config.extension.group_id,
        );
        tracing::info!(topic = %config.topic, group_id = %config.extension.group_id, "Topic is subscribed.");

        Ok(Self {
            context: Arc::new(context),
            consumer,
            pending: HashMap::new(),
        })
    }
}

#[async_trait::async_trait]
impl Subscription for KafkaConsumer {
    fn context(&self) -> &Arc<SubscriptionContext> {
        &self.context
    }

    async fn receive(&mut self) -> Option<Result<QueuedMessage>> {
        let message = match self.consumer.recv().await {
            Ok(message) => message,
            Err(e) => return Some(Err(e.into())),
        };

        let lock_token = LockToken::new();
        let body = message.payload().unwrap_or_default().to_vec();
        self.pending.insert(
            lock_token,
            Position {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
            },
        );

        Some(Ok(QueuedMessage::new(body, lock_token, self.context.clone())))
    }

    async fn complete(&mut self, lock_token: LockToken) -> Result<()> {
        let position = self
            .pending
            .remove(&lock_token)
            .ok_or(Error::LockLost(lock_token))?;

        // 提交的是下一条待消费消息的位移
        let mut offsets = TopicPartitionList::new();
        offsets.add_partition_offset(
            &position.topic,
            position.partition,
            Offset::Offset(position.offset + 1),
        )?;
        self.consumer.commit(&offsets, CommitMode::Async)?;

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.consumer.unsubscribe();
        self.pending.clear();
        tracing::info!(entity_path = %self.context.entity_path, "Topic is unsubscribed.");
        Ok(())
    }
}
