use byte_unit::Byte;
use rolling_file::RollingConditionBasic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

/// 日志配置
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// 最低输出级别
    #[serde(with = "serde_level")]
    pub level: tracing::Level,
    /// 标准输出是否使用 JSON 格式
    pub json: bool,
    /// 滚动日志文件，不配置则只输出到标准输出
    pub file: Option<FileConfig>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            json: false,
            file: None,
        }
    }
}

/// 滚动日志文件配置
#[derive(Debug, Deserialize, Serialize)]
pub struct FileConfig {
    /// 日志目录
    pub path: PathBuf,
    /// 单个文件达到该大小时滚动
    pub trigger_size: Byte,
    /// 保留的历史文件个数
    pub archived_count: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./log"),
            trigger_size: Byte::from_bytes(16 * 1024 * 1024),
            archived_count: 16,
        }
    }
}

mod serde_level {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(level: &tracing::Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(level)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<tracing::Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 日志句柄，进程退出前须一直持有，丢弃时刷新文件缓冲
#[must_use]
pub struct TracingHandle {
    _guard: Option<WorkerGuard>,
}

impl TracingConfig {
    /// 安装全局日志订阅者，`service` 作为日志文件名
    pub fn init(&self, service: &str) -> crate::Result<TracingHandle> {
        let (file, guard) = match &self.file {
            Some(file) => {
                std::fs::create_dir_all(&file.path)?;

                let appender = rolling_file::BasicRollingFileAppender::new(
                    file.path.join(format!("{}.log", service)),
                    RollingConditionBasic::new().max_size(file.trigger_size.get_bytes()),
                    file.archived_count,
                )?;
                let (nonblocking, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(nonblocking.with_max_level(self.level))
                    .json();
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let stdout_json = self.json.then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.with_max_level(self.level))
                .json()
        });

        let stdout_text = (!self.json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.with_max_level(self.level))
        });

        let registry = tracing_subscriber::Registry::default()
            .with(stdout_json)
            .with(stdout_text)
            .with(file);

        tracing::subscriber::set_global_default(registry)?;

        Ok(TracingHandle { _guard: guard })
    }
}
