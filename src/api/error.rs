// ==========================================
// P21 业务规则 - 规则错误类型
// ==========================================
// 职责: 规则执行中的非预期错误；由 RuleRunner 统一转换为失败结果
// 说明: 数据校验未通过不是错误，直接返回 RuleResult::rejected
// ==========================================

use crate::domain::error::{ContextError, DatastreamError};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 规则错误类型
#[derive(Error, Debug)]
pub enum RuleError {
    // ===== 上下文错误 =====
    #[error(transparent)]
    Context(#[from] ContextError),

    // ===== 数据流错误 =====
    #[error(transparent)]
    Datastream(#[from] DatastreamError),

    // ===== 数据访问错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    // ===== 通用错误 =====
    #[error("Rule panicked: {0}")]
    Panic(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// 错误种类（宿主侧分类展示用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleErrorKind {
    NotFound,
    TypeMismatch,
    Conversion,
    Datastream,
    Io,
    Database,
    Internal,
}

impl fmt::Display for RuleErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleErrorKind::NotFound => "NOT_FOUND",
            RuleErrorKind::TypeMismatch => "TYPE_MISMATCH",
            RuleErrorKind::Conversion => "CONVERSION",
            RuleErrorKind::Datastream => "DATASTREAM",
            RuleErrorKind::Io => "IO",
            RuleErrorKind::Database => "DATABASE",
            RuleErrorKind::Internal => "INTERNAL",
        };
        write!(f, "{}", s)
    }
}

impl RuleError {
    pub fn kind(&self) -> RuleErrorKind {
        match self {
            RuleError::Context(e) => match e {
                ContextError::FieldNotFound { .. }
                | ContextError::TableNotFound { .. }
                | ContextError::ColumnNotFound { .. }
                | ContextError::RowNotFound { .. }
                | ContextError::DatastreamMissing => RuleErrorKind::NotFound,
                ContextError::TypeMismatch { .. } | ContextError::DuplicateTable(_) => {
                    RuleErrorKind::TypeMismatch
                }
                ContextError::Conversion { .. } | ContextError::NullValue { .. } => {
                    RuleErrorKind::Conversion
                }
            },
            RuleError::Datastream(DatastreamError::Io(_)) => RuleErrorKind::Io,
            RuleError::Datastream(_) => RuleErrorKind::Datastream,
            RuleError::Repository(_) => RuleErrorKind::Database,
            RuleError::Io(_) => RuleErrorKind::Io,
            RuleError::Panic(_) | RuleError::Other(_) => RuleErrorKind::Internal,
        }
    }
}
