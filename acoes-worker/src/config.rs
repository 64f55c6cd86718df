use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Worker 的配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// 每条消息最多写入几次（含第一次），最小为 1
    ///
    /// 全部失败后消息仍会被确认，不会重投
    pub save_attempts: u32,
    /// 两次写入之间的间隔
    pub save_retry_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            save_attempts: 1,
            save_retry_interval_ms: 1000,
        }
    }
}

impl WorkerConfig {
    pub(crate) fn save_attempts(&self) -> u32 {
        self.save_attempts.max(1)
    }

    pub(crate) fn save_retry_interval(&self) -> Duration {
        Duration::from_millis(self.save_retry_interval_ms)
    }
}
