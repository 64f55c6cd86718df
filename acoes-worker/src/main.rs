use acoes_common::Config;
use acoes_database::config::DatabaseConfig;
use acoes_queue::config::QueueConfig;
use acoes_queue::kafka::KafkaConsumerConfig;
use acoes_queue::pulsar::PulsarConsumerConfig;
use acoes_tracing::config::TracingConfig;
use acoes_utils::shutdown_signal;
use acoes_worker::{DatabaseRepository, Worker, WorkerConfig};
use sea_orm::Database;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Conf {
    #[serde(default)]
    tracing: TracingConfig,
    database: DatabaseConfig,
    #[serde(default)]
    worker: WorkerConfig,

    /// 使用的消息队列中间件
    #[serde(flatten)]
    queue: QueueConfig<KafkaConsumerConfig, PulsarConsumerConfig>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let conf = Conf::from_cli()?;

    let _tracing = conf.tracing.init("acoes-worker")?;

    tracing::info!(?conf);

    let Conf {
        database,
        worker,
        queue,
        ..
    } = conf;

    let database = Database::connect(database).await?;
    let repository = DatabaseRepository::new(database);

    let mut worker = Worker::new(queue, repository, worker);
    worker.start().await?;

    shutdown_signal().await;

    worker.stop().await?;

    Ok(())
}
