#![deny(missing_docs, unsafe_code)]
//! # Tracing
//!
//! 日志输出：标准输出 + 可选的滚动 JSON 文件

/// 配置
pub mod config;
mod error;

pub use error::*;
