use crate::Acao;
use serde_json::{Map, Value};

/// 消息体解码错误
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// 不是 UTF-8 文本
    #[error("Payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// JSON 语法错误或字段类型不匹配
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    /// 顶层不是 JSON 对象
    #[error("Payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// 将消息体解码为 [`Acao`]
///
/// 顶层字段名不区分大小写；任何输入都不会 panic，失败以 `Err` 返回
pub fn decode(payload: &[u8]) -> Result<Acao, DecodeError> {
    let text = std::str::from_utf8(payload)?;

    let fields = match serde_json::from_str::<Value>(text)? {
        Value::Object(fields) => fields,
        other => return Err(DecodeError::NotAnObject(kind(&other))),
    };

    // 同名字段（忽略大小写）出现多次时，后出现的覆盖先出现的
    let fields = fields
        .into_iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect::<Map<String, Value>>();

    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
