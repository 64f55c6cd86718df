use acoes_database::acao;
use acoes_domain::Acao;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr};
use std::borrow::Cow;

/// 写入失败
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// 数据库错误
    #[error(transparent)]
    Database(#[from] DbErr),
    /// 其他错误
    #[error("{0}")]
    Other(Cow<'static, str>),
}

/// 交易记录的存储
///
/// 只会收到已通过校验的记录，且不会被并发调用
#[async_trait]
pub trait AcaoRepository: Send + Sync + 'static {
    /// 写入一条记录
    async fn save(&self, acao: &Acao) -> Result<(), RepositoryError>;
}

/// 基于 sea-orm 的交易记录存储
#[derive(Clone)]
pub struct DatabaseRepository<B> {
    backend: B,
}

impl<B> DatabaseRepository<B> {
    /// 构造数据库存储
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AcaoRepository for DatabaseRepository<DatabaseConnection> {
    async fn save(&self, acao: &Acao) -> Result<(), RepositoryError> {
        let model = acao::ActiveModel::from(acao).insert(&self.backend).await?;
        tracing::debug!(id = model.id, codigo = %model.codigo, "Row inserted");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{AcaoRepository, DatabaseRepository};
    use acoes_database::acao;
    use acoes_domain::Acao;
    use sea_orm::prelude::DateTime;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn insert() -> anyhow::Result<()> {
        let database = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![acao::Model {
                id: 1,
                codigo: "PETR4".into(),
                quantidade: 100,
                preco: 28.5,
                data_registro: DateTime::from_timestamp(1_700_000_000, 0),
            }]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .into_connection();

        let repository = DatabaseRepository::new(database);
        repository.save(&Acao::new("PETR4", 100, 28.5)).await?;

        let log = format!("{:?}", repository.backend.into_transaction_log());
        assert!(log.contains("INSERT INTO"));
        assert!(log.contains("PETR4"));
        Ok(())
    }
}
