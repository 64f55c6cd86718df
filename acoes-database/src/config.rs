use acoes_utils::secret::Secret;
use sea_orm::ConnectOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 数据库配置
#[derive(Debug, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 协议，例如 postgres、mysql
    pub schema: String,
    /// 主机名
    pub host: String,
    /// 端口
    pub port: u16,
    /// 用户名
    pub username: String,
    ///密码
    pub password: Secret,
    /// 数据库名
    pub path: String,
    /// 连接池最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 连接池最小连接数
    #[serde(default)]
    pub min_connections: u32,
    /// 连接超时时间
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// 空闲超时时间
    #[serde(default = "default_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// sqlx 日志开关
    #[serde(default)]
    pub sqlx_log: bool,
}

// 消息逐条写入，连接池不需要很大
fn default_max_connections() -> u32 {
    4
}

fn default_timeout_ms() -> u64 {
    8000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            schema: "postgres".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            username: "acoes".to_string(),
            password: Secret::default(),
            path: "acoes".to_string(),
            max_connections: default_max_connections(),
            min_connections: 0,
            connect_timeout_ms: default_timeout_ms(),
            idle_timeout_ms: default_timeout_ms(),
            sqlx_log: false,
        }
    }
}

impl DatabaseConfig {
    /// 获取连接 URL
    pub fn connection_url(&self) -> Secret {
        Secret::new(format!(
            "{}://{}:{}@{}:{}/{}",
            self.schema,
            self.username,
            self.password.expose(),
            self.host,
            self.port,
            self.path
        ))
    }
}

impl From<DatabaseConfig> for ConnectOptions {
    fn from(config: DatabaseConfig) -> Self {
        let connection_url = config.connection_url();

        let mut opt = ConnectOptions::new(connection_url.expose().to_string());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .sqlx_logging(config.sqlx_log);

        opt
    }
}
