mod config;
mod consumer;
mod error;

pub use config::*;
pub use consumer::*;
pub use error::*;
