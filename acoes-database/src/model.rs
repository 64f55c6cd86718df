/// 股票交易记录表
#[allow(missing_docs)] // items generated by DeriveEntityModel carry no docs
pub mod acao {
    use acoes_domain::Acao;
    use sea_orm::entity::prelude::*;
    use sea_orm::{ActiveValue, Set};

    /// 表 `acao` 的一行
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "acao")]
    pub struct Model {
        /// 自增主键
        #[sea_orm(primary_key)]
        pub id: i64,
        /// 股票代码
        pub codigo: String,
        /// 数量
        pub quantidade: i64,
        /// 单价
        pub preco: f64,
        /// 写入时间，由数据库默认值填充
        pub data_registro: DateTime,
    }

    /// 无关联
    #[derive(Copy, Clone, Debug, EnumIter)]
    pub enum Relation {}

    impl RelationTrait for Relation {
        fn def(&self) -> RelationDef {
            match *self {}
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<&Acao> for ActiveModel {
        fn from(acao: &Acao) -> Self {
            Self {
                id: ActiveValue::NotSet,
                codigo: Set(acao.codigo.clone()),
                quantidade: Set(acao.quantidade),
                preco: Set(acao.preco),
                data_registro: ActiveValue::NotSet,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::ActiveModel;
        use acoes_domain::Acao;
        use sea_orm::ActiveValue;

        #[test]
        fn from_acao() {
            let model = ActiveModel::from(&Acao::new("PETR4", 100, 28.5));
            assert!(matches!(&model.codigo, ActiveValue::Set(codigo) if codigo == "PETR4"));
            assert!(matches!(model.quantidade, ActiveValue::Set(100)));
            assert!(matches!(model.preco, ActiveValue::Set(p) if p == 28.5));
            assert!(matches!(model.id, ActiveValue::NotSet));
            assert!(matches!(model.data_registro, ActiveValue::NotSet));
        }
    }
}
