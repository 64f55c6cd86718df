use crate::Result;
use clap::Parser;
use config::Environment;
use serde::Deserialize;
use std::path::PathBuf;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "ACOES";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 配置
///
pub trait Config: Sized {
    /// 根据命令行参数获得所有配置文件并构造配置对象
    ///
    fn from_cli() -> Result<Self> {
        Self::from_opts(Opts::parse())
    }

    /// 从 Opts 获得所有配置文件并构造配置对象
    ///
    /// 靠前的配置文件优先级更高，环境变量优先级最高；
    /// 未指定配置文件时只读取环境变量
    fn from_opts(opts: Opts) -> Result<Self>;
}

impl<'de, T: Deserialize<'de>> Config for T {
    fn from_opts(opts: Opts) -> Result<Self> {
        let Opts {
            configs,
            config_root_path,
        } = opts;

        let mut builder = config::Config::builder();

        for conf in configs.into_iter().rev() {
            let path = match &config_root_path {
                None => conf,
                Some(root) => root.join(conf),
            };
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR));

        Ok(builder.build()?.try_deserialize()?)
    }
}

/// 命令行启动参数
#[derive(Debug, Default, Parser)]
#[clap(name = "Acoes Worker")]
pub struct Opts {
    /// 配置文件，支持多个文件，用空格分隔
    #[clap(short = 'c', long, multiple_values = true)]
    pub configs: Vec<PathBuf>,

    /// 配置文件根目录，相对路径的配置文件从该目录查找
    #[clap(short = 'r', long)]
    pub config_root_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::{Config, Opts};
    use serde::{Deserialize, Serialize};
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use temp_dir::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct Subscription {
        topic: String,
        subscription: String,
        servers: String,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
    struct TestConfig {
        kafka: Subscription,
        save_attempts: u32,
    }

    fn sample(topic: &str, save_attempts: u32) -> TestConfig {
        TestConfig {
            kafka: Subscription {
                topic: topic.into(),
                subscription: "acoes-worker".into(),
                servers: "localhost:9092".into(),
            },
            save_attempts,
        }
    }

    #[test]
    fn missing_field() -> std::io::Result<()> {
        let d = TempDir::new()?;
        let filename = write_json(d.path(), &serde_json::json!({ "save_attempts": 1 }))?;

        let opts = Opts {
            configs: vec![filename],
            config_root_path: Some(d.path().to_path_buf()),
        };

        assert!(TestConfig::from_opts(opts).is_err());
        Ok(())
    }

    #[test]
    fn root_path_is_optional() -> crate::Result<()> {
        let expected = sample("acoes", 1);
        let d = TempDir::new()?;
        let filename = write_json(d.path(), &expected)?;

        let relative = Opts {
            configs: vec![filename.clone()],
            config_root_path: Some(d.path().to_path_buf()),
        };
        assert_eq!(TestConfig::from_opts(relative)?, expected);

        let absolute = Opts {
            configs: vec![d.path().join(filename)],
            config_root_path: None,
        };
        assert_eq!(TestConfig::from_opts(absolute)?, expected);

        Ok(())
    }

    #[test]
    fn first_file_wins() -> crate::Result<()> {
        let base = sample("acoes", 1);
        let overlay = sample("acoes.replay", 3);

        let d = TempDir::new()?;
        let base_file = write_json(d.path(), &base)?;
        let overlay_file = write_json(d.path(), &overlay)?;

        let opts = Opts {
            configs: vec![overlay_file.clone(), base_file.clone()],
            config_root_path: Some(d.path().to_path_buf()),
        };
        assert_eq!(TestConfig::from_opts(opts)?, overlay);

        let opts = Opts {
            configs: vec![base_file, overlay_file],
            config_root_path: Some(d.path().to_path_buf()),
        };
        assert_eq!(TestConfig::from_opts(opts)?, base);

        Ok(())
    }

    #[test]
    fn partial_overlay() -> crate::Result<()> {
        let d = TempDir::new()?;
        let base_file = write_json(d.path(), &sample("acoes", 1))?;
        let overlay_file = write_json(d.path(), &serde_json::json!({ "save_attempts": 5 }))?;

        let opts = Opts {
            configs: vec![overlay_file, base_file],
            config_root_path: Some(d.path().to_path_buf()),
        };

        assert_eq!(TestConfig::from_opts(opts)?, sample("acoes", 5));
        Ok(())
    }

    fn write_json<T: ?Sized + Serialize>(dir: &Path, value: &T) -> std::io::Result<PathBuf> {
        let filename = PathBuf::from(format!("{}.json", uuid::Uuid::new_v4().as_simple()));
        let file = File::create(dir.join(&filename))?;
        serde_json::to_writer(file, value).map_err(std::io::Error::from)?;
        Ok(filename)
    }
}
