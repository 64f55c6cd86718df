mod config;
mod consumer;
mod error;

pub use config::*;
pub use consumer::*;
pub use error::*;
use pulsar::{DeserializeMessage, Payload};

/// 未解码的消息体，解码交给消息处理器
pub struct RawBody;

impl DeserializeMessage for RawBody {
    type Output = Vec<u8>;

    fn deserialize_message(payload: &Payload) -> Self::Output {
        payload.data.clone()
    }
}
