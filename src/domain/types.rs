// ==========================================
// P21 业务规则 - 领域类型定义
// ==========================================
// 职责: 规则类型、列类型、单元格值、处置代码等基础枚举
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 规则类型 (Rule Kind)
// ==========================================
// 决定宿主在何种触发点调用规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    General,  // 通用字段校验
    OnDemand, // 按钮触发
    Validator, // 字段校验器
    OnEvent,  // 生命周期事件
}

impl RuleKind {
    /// 事件类规则出错时需要写入持久化日志
    pub fn persists_errors(&self) -> bool {
        matches!(self, RuleKind::OnEvent)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::General => write!(f, "GENERAL"),
            RuleKind::OnDemand => write!(f, "ON_DEMAND"),
            RuleKind::Validator => write!(f, "VALIDATOR"),
            RuleKind::OnEvent => write!(f, "ON_EVENT"),
        }
    }
}

// ==========================================
// 列类型 (Column Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Decimal,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Decimal => write!(f, "decimal"),
        }
    }
}

// ==========================================
// 单元格值 (Value)
// ==========================================
// Null 对应宿主侧 DBNull
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 值能否写入指定类型的列
    ///
    /// Null 可写入任意列；整数可写入 decimal 列（写入时拓宽）
    pub fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Value::Null, _)
                | (Value::Text(_), ColumnType::Text)
                | (Value::Integer(_), ColumnType::Integer)
                | (Value::Integer(_), ColumnType::Decimal)
                | (Value::Decimal(_), ColumnType::Decimal)
        )
    }

    /// 按列类型归一化（Integer → Decimal）
    pub fn coerce(self, column_type: ColumnType) -> Value {
        match (self, column_type) {
            (Value::Integer(i), ColumnType::Decimal) => Value::Decimal(Decimal::from(i)),
            (v, _) => v,
        }
    }

    /// 数值视图（文本列尝试解析）
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Text(s) => Decimal::from_str(s.trim()).ok(),
            Value::Null => None,
        }
    }

    /// 字符串视图，Null 为 None
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ==========================================
// 订单行处置代码 (Disposition)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "H")]
    Hold,
    #[serde(rename = "B")]
    Backorder,
}

impl Disposition {
    pub fn code(&self) -> &'static str {
        match self {
            Disposition::Hold => "H",
            Disposition::Backorder => "B",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 行排序方式 (Sort Order)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}
