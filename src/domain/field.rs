// ==========================================
// P21 业务规则 - 字段集合
// ==========================================
// 职责: 单行规则传入的字段（别名/表名/列名/类名/值）
// ==========================================

use crate::domain::error::{ContextError, ContextResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 宿主标记为全局的字段类名（校验类规则跳过）
pub const GLOBAL_CLASS_NAME: &str = "global";

/// 传入规则的单个字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    pub table_name: String,
    pub field_name: String,
    pub alias: Option<String>,
    pub class_name: String,
    /// None 表示宿主侧为 DBNull
    pub value: Option<String>,
}

impl DataField {
    pub fn new(table_name: &str, field_name: &str, value: Option<&str>) -> Self {
        Self {
            table_name: table_name.to_string(),
            field_name: field_name.to_string(),
            alias: None,
            class_name: String::new(),
            value: value.map(str::to_string),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn is_global(&self) -> bool {
        self.class_name == GLOBAL_CLASS_NAME
    }

    /// 规则中使用的键：别名优先，否则列名
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field_name)
    }

    /// 值的字符串视图（Null 视为空串）
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// 解析为数值；Null 视为 0
    pub fn decimal_or_zero(&self) -> ContextResult<Decimal> {
        match self.value.as_deref() {
            None => Ok(Decimal::ZERO),
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Ok(Decimal::ZERO);
                }
                Decimal::from_str(trimmed).map_err(|_| ContextError::Conversion {
                    column: self.key().to_string(),
                    value: raw.to_string(),
                    target: "decimal".to_string(),
                })
            }
        }
    }

    /// 完全限定名 table.field，用于提示消息
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name, self.field_name)
    }
}

// ==========================================
// FieldSet - 有序字段集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: Vec<DataField>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: DataField) {
        self.fields.push(field);
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, alias: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.alias.as_deref() == Some(alias))
            .or_else(|| self.fields.iter().position(|f| f.field_name == alias))
    }

    /// 按别名查找（别名未命中时回退列名）
    pub fn get(&self, alias: &str) -> ContextResult<&DataField> {
        self.position(alias)
            .map(|i| &self.fields[i])
            .ok_or_else(|| ContextError::FieldNotFound {
                alias: alias.to_string(),
            })
    }

    pub fn get_mut(&mut self, alias: &str) -> ContextResult<&mut DataField> {
        match self.position(alias) {
            Some(i) => Ok(&mut self.fields[i]),
            None => Err(ContextError::FieldNotFound {
                alias: alias.to_string(),
            }),
        }
    }

    /// 写入字段值
    pub fn set_value(&mut self, alias: &str, value: &str) -> ContextResult<()> {
        self.get_mut(alias)?.value = Some(value.to_string());
        Ok(())
    }
}

impl FromIterator<DataField> for FieldSet {
    fn from_iter<I: IntoIterator<Item = DataField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
