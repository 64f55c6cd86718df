#![deny(missing_docs, unsafe_code)]
//! # Common
//!
//! 配置加载：命令行指定的配置文件 + `ACOES` 前缀的环境变量
//!

mod conf;
mod error;

pub use conf::*;
pub use error::*;
