use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid SubType: {0}")]
    InvalidSubType(String),
    #[error(transparent)]
    Pulsar(#[from] pulsar::Error),
    #[error(transparent)]
    PulsarConsumer(#[from] pulsar::error::ConsumerError),
}

pub type Result<T> = std::result::Result<T, Error>;
