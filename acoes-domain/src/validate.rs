use crate::Acao;
use std::fmt;

/// 字段校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// 字段名（与消息中的字段名一致）
    pub field: &'static str,
    /// 原因
    pub reason: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// 校验结果，按规则顺序列出所有不通过的字段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// 是否全部通过
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// 不通过的字段
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// 单条校验规则
pub struct Rule {
    /// 字段名
    pub field: &'static str,
    /// 字段满足规则时返回 `true`
    pub check: fn(&Acao) -> bool,
    /// 不满足时的原因
    pub reason: &'static str,
}

/// `Acao` 的校验规则表
pub const RULES: &[Rule] = &[
    Rule {
        field: "codigo",
        check: |acao| !acao.codigo.trim().is_empty(),
        reason: "must not be empty",
    },
    Rule {
        field: "quantidade",
        check: |acao| acao.quantidade > 0,
        reason: "must be greater than zero",
    },
    Rule {
        field: "preco",
        check: |acao| acao.preco > 0.0,
        reason: "must be greater than zero",
    },
];

/// 按 [`RULES`] 校验 `acao`，无副作用
pub fn validate(acao: &Acao) -> ValidationResult {
    let errors = RULES
        .iter()
        .filter(|rule| !(rule.check)(acao))
        .map(|rule| FieldError {
            field: rule.field,
            reason: rule.reason,
        })
        .collect();

    ValidationResult { errors }
}
