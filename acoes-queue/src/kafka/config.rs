use crate::error::require;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type KafkaConsumerConfig = KafkaConfig<ConsumerConfig>;

#[derive(Debug, Deserialize, Serialize)]
pub struct KafkaConfig<T> {
    /// 服务器地址（连接目标）
    pub servers: String,

    /// 主题
    pub topic: String,

    /// 其他配置
    #[serde(flatten)]
    pub extension: T,
}

impl<T: Default> Default for KafkaConfig<T> {
    fn default() -> Self {
        Self {
            servers: "localhost:9092".into(),
            topic: "acoes".into(),
            extension: T::default(),
        }
    }
}

/// Kafka 消费配置
///
/// 自动提交始终关闭，由消费者在处理完每条消息后提交位移
#[derive(Debug, Deserialize, Serialize)]
pub struct ConsumerConfig {
    /// 消费组，即订阅名
    pub group_id: String,

    #[serde(default = "default_auto_offset_reset")]
    pub auto_offset_reset: String,

    #[serde(default = "default_session_timeout_ms")]
    pub session_timeout_ms: u64,

    /// 透传给 librdkafka 的其他参数，例如 `security.protocol`
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

fn default_auto_offset_reset() -> String {
    "earliest".to_string()
}

fn default_session_timeout_ms() -> u64 {
    30000
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: "acoes-worker".to_string(),
            auto_offset_reset: default_auto_offset_reset(),
            session_timeout_ms: default_session_timeout_ms(),
            properties: BTreeMap::new(),
        }
    }
}

impl KafkaConsumerConfig {
    /// 检查连接目标、主题、订阅是否都已配置
    pub fn check(&self) -> crate::error::Result<()> {
        require("kafka.servers", &self.servers)?;
        require("kafka.topic", &self.topic)?;
        require("kafka.group_id", &self.extension.group_id)
    }
}
