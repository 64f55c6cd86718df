use crate::LockToken;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),
    #[error("Unknown or expired lock token: {0}")]
    LockLost(LockToken),
    #[error("Message handler panicked: {0}")]
    HandlerPanicked(Cow<'static, str>),
    #[error("Subscription is unavailable: {0}")]
    Unavailable(Cow<'static, str>),
    #[error(transparent)]
    Kafka(#[from] crate::kafka::Error),
    #[error(transparent)]
    Pulsar(#[from] crate::pulsar::Error),
}

impl From<rdkafka::error::KafkaError> for Error {
    fn from(e: rdkafka::error::KafkaError) -> Self {
        Self::Kafka(e.into())
    }
}

impl From<pulsar::Error> for Error {
    fn from(e: pulsar::Error) -> Self {
        Self::Pulsar(e.into())
    }
}

impl From<pulsar::error::ConsumerError> for Error {
    fn from(e: pulsar::error::ConsumerError) -> Self {
        Self::Pulsar(e.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// 检查必填的配置项
pub(crate) fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::MissingConfig(name))
    } else {
        Ok(())
    }
}
