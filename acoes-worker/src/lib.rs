#![deny(missing_docs, unsafe_code)]
//! # Worker
//!
//! 订阅股票交易事件，逐条解码、校验、写入数据库并确认消息

mod config;
mod error;
mod repository;
mod worker;

pub use crate::config::*;
pub use error::*;
pub use repository::*;
pub use worker::*;
