// ==========================================
// P21 业务规则 - 数据上下文错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 数据上下文访问错误
///
/// 字段/表/列/行查找失败在此给出明确的种类，替代运行期字典未命中
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    // ===== 查找失败 =====
    #[error("Field '{alias}' was not passed to the rule")]
    FieldNotFound { alias: String },

    #[error("Table '{table}' was not found in the data set")]
    TableNotFound { table: String },

    #[error("Column '{column}' does not belong to table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("Table '{table}' has no row {index}")]
    RowNotFound { table: String, index: usize },

    // ===== 类型错误 =====
    #[error("Column '{column}' expects {expected} but got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Cannot convert '{value}' in '{column}' to {target}")]
    Conversion {
        column: String,
        value: String,
        target: String,
    },

    #[error("Column '{column}' is null")]
    NullValue { column: String },

    // ===== 结构错误 =====
    #[error("Table '{0}' already exists in the data set")]
    DuplicateTable(String),

    #[error("No XML datastream was supplied to the rule")]
    DatastreamMissing,
}

/// 数据流（XML）错误
#[derive(Error, Debug)]
pub enum DatastreamError {
    #[error("Datastream is not well-formed XML: {0}")]
    Parse(String),

    #[error("Failed to write datastream: {0}")]
    Write(String),

    #[error("Datastream contains no {0} element")]
    MissingElement(String),

    #[error("Datastream has no origin file path")]
    NoFilePath,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ContextResult<T> = Result<T, ContextError>;
