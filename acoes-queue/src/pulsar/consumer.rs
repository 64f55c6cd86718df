use crate::error::{Error, Result};
use crate::pulsar::{PulsarConsumerConfig, RawBody};
use crate::{LockToken, QueuedMessage, Subscription, SubscriptionContext};
use pulsar::consumer::{InitialPosition, Message};
use pulsar::{Consumer, ConsumerOptions, Pulsar, SubType, TokioExecutor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_stream::StreamExt;

pub struct PulsarConsumer {
    context: Arc<SubscriptionContext>,
    /// 关闭后为 `None`
    consumer: Option<Consumer<RawBody, TokioExecutor>>,
    pending: HashMap<LockToken, Message<RawBody>>,
}

impl PulsarConsumer {
    pub async fn new(config: &PulsarConsumerConfig) -> Result<Self> {
        config.check()?;

        let sub_type = match config.extension.subscription_type.as_str() {
            "exclusive" | "0" => SubType::Exclusive,
            "shared" | "1" => SubType::Shared,
            "failover" | "2" => SubType::Failover,
            "keyshared" | "3" => SubType::KeyShared,
            _ => {
                return Err(crate::pulsar::Error::InvalidSubType(
                    config.extension.subscription_type.clone(),
                )
                .into())
            }
        };

        let pulsar = Pulsar::builder(config.url.to_string(), TokioExecutor)
            .build()
            .await?;
        let mut builder = pulsar
            .consumer()
            .with_topic(&config.topic)
            .with_subscription_type(sub_type)
            .with_subscription(&config.extension.subscription_name);

        if let Some(consumer_name) = &config.extension.consumer_name {
            builder = builder.with_consumer_name(consumer_name);
        }

        let consumer = builder
            .with_options(ConsumerOptions {
                initial_position: InitialPosition::Earliest,
                ..Default::default()
            })
            .build()
            .await?;

        let context = SubscriptionContext::new(
            config.url.as_str(),
            &config.topic,
            &config.extension.subscription_name,
        );
        tracing::info!(topic = %config.topic, subscription = %config.extension.subscription_name, "Topic is subscribed.");

        Ok(Self {
            context: Arc::new(context),
            consumer: Some(consumer),
            pending: HashMap::new(),
        })
    }
}

#[async_trait::async_trait]
impl Subscription for PulsarConsumer {
    fn context(&self) -> &Arc<SubscriptionContext> {
        &self.context
    }

    async fn receive(&mut self) -> Option<Result<QueuedMessage>> {
        let consumer = self.consumer.as_mut()?;
        let message = match consumer.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(e.into())),
        };

        let lock_token = LockToken::new();
        let body = message.deserialize();
        self.pending.insert(lock_token, message);

        Some(Ok(QueuedMessage::new(body, lock_token, self.context.clone())))
    }

    async fn complete(&mut self, lock_token: LockToken) -> Result<()> {
        let message = self
            .pending
            .remove(&lock_token)
            .ok_or(Error::LockLost(lock_token))?;

        let consumer = self
            .consumer
            .as_mut()
            .ok_or_else(|| Error::Unavailable("Subscription is closed.".into()))?;
        consumer.ack(&message).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // 丢弃消费者即向服务端发送关闭请求，订阅本身保留，未确认的消息会被重投
        self.pending.clear();
        drop(self.consumer.take());
        tracing::info!(entity_path = %self.context.entity_path, "Topic is unsubscribed.");
        Ok(())
    }
}
