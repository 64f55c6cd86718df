use crate::error::require;
use serde::{Deserialize, Serialize};

/// Pulsar 消费者配置
pub type PulsarConsumerConfig = PulsarConfig<ConsumerConfig>;

/// Pulsar 配置
#[derive(Debug, Serialize, Deserialize)]
pub struct PulsarConfig<T> {
    /// 服务器地址（连接目标）
    pub url: url::Url,

    /// 主题
    pub topic: String,

    /// 其他配置
    #[serde(flatten)]
    pub extension: T,
}

impl<T: Default> Default for PulsarConfig<T> {
    fn default() -> Self {
        Self {
            url: url::Url::parse("pulsar://localhost:6650")
                .expect("Failed to parse default pulsar url."),
            topic: "persistent://public/default/acoes".into(),
            extension: T::default(),
        }
    }
}

/// Pulsar 消费配置
#[derive(Debug, Deserialize, Serialize)]
pub struct ConsumerConfig {
    /// 订阅名
    pub subscription_name: String,

    /// 消费者名
    #[serde(default)]
    pub consumer_name: Option<String>,

    /// 订阅类型：exclusive、shared、failover、keyshared
    ///
    /// 默认 failover，同一时刻只有一个实例消费，保持投递顺序
    #[serde(default = "default_subscription_type")]
    pub subscription_type: String,
}

fn default_subscription_type() -> String {
    "failover".into()
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            subscription_name: "acoes-worker".into(),
            consumer_name: None,
            subscription_type: default_subscription_type(),
        }
    }
}

impl PulsarConsumerConfig {
    /// 检查连接目标、主题、订阅是否都已配置
    pub fn check(&self) -> crate::error::Result<()> {
        require("pulsar.topic", &self.topic)?;
        require("pulsar.subscription_name", &self.extension.subscription_name)
    }
}

#[cfg(test)]
mod test {
    use super::PulsarConsumerConfig;
    use crate::error::Error;

    #[test]
    fn default_is_complete() {
        assert!(PulsarConsumerConfig::default().check().is_ok());
    }

    #[test]
    fn minimal() -> serde_json::Result<()> {
        let config: PulsarConsumerConfig = serde_json::from_str(
            r#"{ "url": "pulsar://broker:6650", "topic": "acoes", "subscription_name": "worker" }"#,
        )?;
        assert_eq!(config.extension.subscription_type, "failover");
        assert!(config.extension.consumer_name.is_none());
        assert!(config.check().is_ok());
        Ok(())
    }

    #[test]
    fn empty_subscription() {
        let mut config = PulsarConsumerConfig::default();
        config.extension.subscription_name.clear();
        assert!(matches!(
            config.check(),
            Err(Error::MissingConfig("pulsar.subscription_name"))
        ));
    }

    #[test]
    fn invalid_url() {
        let config = serde_json::from_str::<PulsarConsumerConfig>(
            r#"{ "url": "not a url", "topic": "acoes", "subscription_name": "worker" }"#,
        );
        assert!(config.is_err());
    }
}
