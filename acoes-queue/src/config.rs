use crate::error::Result;
use crate::kafka::{KafkaConsumer, KafkaConsumerConfig};
use crate::pulsar::{PulsarConsumer, PulsarConsumerConfig};
use crate::{Connect, Subscription};
use serde::{Deserialize, Serialize};

/// 队列配置
#[derive(Debug, Deserialize, Serialize)]
pub enum QueueConfig<K, P> {
    /// Kafka 配置
    #[serde(rename = "kafka")]
    Kafka(
        /// 配置值
        K,
    ),

    /// Pulsar 配置
    #[serde(rename = "pulsar")]
    Pulsar(
        /// 配置值
        P,
    ),
}

/// 按配置的中间件打开订阅
#[async_trait::async_trait]
impl Connect for QueueConfig<KafkaConsumerConfig, PulsarConsumerConfig> {
    async fn connect(&self) -> Result<Box<dyn Subscription>> {
        let subscription: Box<dyn Subscription> = match self {
            QueueConfig::Kafka(config) => Box::new(KafkaConsumer::new(config).await?),
            QueueConfig::Pulsar(config) => Box::new(PulsarConsumer::new(config).await?),
        };

        Ok(subscription)
    }
}
