#![deny(missing_docs, unsafe_code)]
//! # Domain
//!
//! 股票交易事件 `Acao` 的定义、解码与业务校验
//!

mod decode;
mod validate;

pub use decode::*;
pub use validate::*;
use serde::{Deserialize, Serialize};

/// 股票交易事件
///
/// 每条消息解码出一个新的 `Acao`，处理完成后即丢弃；
/// 缺失的字段取空值，交由 [`validate`] 报告
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Acao {
    /// 股票代码，例如 `PETR4`
    pub codigo: String,
    /// 数量
    pub quantidade: i64,
    /// 单价
    pub preco: f64,
}

impl Acao {
    /// 构造
    pub fn new(codigo: impl Into<String>, quantidade: i64, preco: f64) -> Self {
        Self {
            codigo: codigo.into(),
            quantidade,
            preco,
        }
    }
}
