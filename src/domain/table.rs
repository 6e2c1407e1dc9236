// ==========================================
// P21 业务规则 - 数据集与数据表
// ==========================================
// 职责: 多行规则使用的表结构（有序行、具名类型列）
// 说明: 行内记录修改列的先后顺序，供宿主按规则代码顺序回写
// ==========================================

use crate::domain::error::{ContextError, ContextResult};
use crate::domain::types::{ColumnType, Value};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// Column / DataRow
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    cells: Vec<Value>,
    /// 修改过的列（按首次修改顺序）
    modified: Vec<String>,
    /// 规则执行期间新增的行
    is_new: bool,
}

impl DataRow {
    pub fn modified_columns(&self) -> &[String] {
        &self.modified
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

// ==========================================
// RowAccess - 行的类型化读取
// ==========================================
pub trait RowAccess {
    fn table_name(&self) -> &str;
    fn columns(&self) -> &[Column];
    fn cells(&self) -> &[Value];

    fn column_index(&self, column: &str) -> ContextResult<usize> {
        self.columns()
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| ContextError::ColumnNotFound {
                table: self.table_name().to_string(),
                column: column.to_string(),
            })
    }

    fn value(&self, column: &str) -> ContextResult<&Value> {
        let idx = self.column_index(column)?;
        Ok(&self.cells()[idx])
    }

    /// 可空数值（Null → None）
    fn opt_decimal(&self, column: &str) -> ContextResult<Option<Decimal>> {
        let value = self.value(column)?;
        match value {
            Value::Null => Ok(None),
            Value::Decimal(d) => Ok(Some(*d)),
            Value::Integer(i) => Ok(Some(Decimal::from(*i))),
            Value::Text(_) => value.as_decimal().map(Some).ok_or_else(|| ContextError::Conversion {
                column: column.to_string(),
                value: value.to_string(),
                target: "decimal".to_string(),
            }),
        }
    }

    /// 非空数值，Null 报错
    fn decimal(&self, column: &str) -> ContextResult<Decimal> {
        self.opt_decimal(column)?.ok_or_else(|| ContextError::NullValue {
            column: column.to_string(),
        })
    }

    /// 字符串视图（Null → 空串）
    fn string(&self, column: &str) -> ContextResult<String> {
        Ok(self.value(column)?.to_string())
    }
}

/// 只读行视图
pub struct RowRef<'a> {
    table: &'a DataTable,
    row: &'a DataRow,
}

impl RowAccess for RowRef<'_> {
    fn table_name(&self) -> &str {
        &self.table.name
    }
    fn columns(&self) -> &[Column] {
        &self.table.columns
    }
    fn cells(&self) -> &[Value] {
        &self.row.cells
    }
}

impl RowRef<'_> {
    pub fn modified_columns(&self) -> &[String] {
        &self.row.modified
    }

    pub fn is_new(&self) -> bool {
        self.row.is_new
    }
}

/// 可写行视图
pub struct RowMut<'a> {
    table_name: &'a str,
    columns: &'a [Column],
    row: &'a mut DataRow,
}

impl RowAccess for RowMut<'_> {
    fn table_name(&self) -> &str {
        self.table_name
    }
    fn columns(&self) -> &[Column] {
        self.columns
    }
    fn cells(&self) -> &[Value] {
        &self.row.cells
    }
}

impl RowMut<'_> {
    /// 写入单元格（按列类型校验，记录修改顺序）
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> ContextResult<()> {
        let idx = self.column_index(column)?;
        let column_type = self.columns[idx].column_type;
        let value = value.into();

        if !value.fits(column_type) {
            return Err(ContextError::TypeMismatch {
                column: column.to_string(),
                expected: column_type.to_string(),
                actual: value.type_name().to_string(),
            });
        }

        self.row.cells[idx] = value.coerce(column_type);
        if !self.row.modified.iter().any(|c| c == column) {
            self.row.modified.push(column.to_string());
        }
        Ok(())
    }
}

// ==========================================
// RowPredicate - 行筛选条件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowPredicate {
    Eq(String, Value),
    And(Box<RowPredicate>, Box<RowPredicate>),
}

impl RowPredicate {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        RowPredicate::Eq(column.to_string(), value.into())
    }

    pub fn and(self, other: RowPredicate) -> Self {
        RowPredicate::And(Box::new(self), Box::new(other))
    }

    fn check_columns(&self, table: &DataTable) -> ContextResult<()> {
        match self {
            RowPredicate::Eq(column, _) => table.column_index(column).map(|_| ()),
            RowPredicate::And(a, b) => {
                a.check_columns(table)?;
                b.check_columns(table)
            }
        }
    }

    fn matches(&self, row: &RowRef<'_>) -> bool {
        match self {
            RowPredicate::Eq(column, expected) => match row.value(column) {
                Ok(actual) => loosely_equal(actual, expected),
                Err(_) => false,
            },
            RowPredicate::And(a, b) => a.matches(row) && b.matches(row),
        }
    }
}

/// 数值按数值比较，其余按字符串忽略大小写比较；Null 不等于任何值
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    if actual.is_null() || expected.is_null() {
        return false;
    }
    let numeric = |v: &Value| matches!(v, Value::Integer(_) | Value::Decimal(_));
    if numeric(actual) || numeric(expected) {
        if let (Some(a), Some(b)) = (actual.as_decimal(), expected.as_decimal()) {
            return a == b;
        }
    }
    actual.to_string().eq_ignore_ascii_case(&expected.to_string())
}

// ==========================================
// DataTable
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<DataRow>,
}

impl DataTable {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> ContextResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| ContextError::ColumnNotFound {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// 宿主装载行（不计入修改记录）
    ///
    /// 未给出的列为 Null
    pub fn load_row<I, K, V>(&mut self, values: I) -> ContextResult<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut cells = vec![Value::Null; self.columns.len()];
        for (key, value) in values {
            let idx = self.column_index(key.as_ref())?;
            let column_type = self.columns[idx].column_type;
            let value = value.into();
            if !value.fits(column_type) {
                return Err(ContextError::TypeMismatch {
                    column: key.as_ref().to_string(),
                    expected: column_type.to_string(),
                    actual: value.type_name().to_string(),
                });
            }
            cells[idx] = value.coerce(column_type);
        }
        self.rows.push(DataRow {
            cells,
            modified: Vec::new(),
            is_new: false,
        });
        Ok(self.rows.len() - 1)
    }

    /// 规则新增一行（全部为 Null）
    pub(crate) fn push_new_row(&mut self) -> usize {
        self.rows.push(DataRow {
            cells: vec![Value::Null; self.columns.len()],
            modified: Vec::new(),
            is_new: true,
        });
        self.rows.len() - 1
    }

    pub fn row(&self, index: usize) -> ContextResult<RowRef<'_>> {
        self.rows
            .get(index)
            .map(|row| RowRef { table: self, row })
            .ok_or_else(|| ContextError::RowNotFound {
                table: self.name.clone(),
                index,
            })
    }

    pub fn row_mut(&mut self, index: usize) -> ContextResult<RowMut<'_>> {
        let table_name = &self.name;
        let columns = &self.columns;
        match self.rows.get_mut(index) {
            Some(row) => Ok(RowMut {
                table_name,
                columns,
                row,
            }),
            None => Err(ContextError::RowNotFound {
                table: table_name.clone(),
                index,
            }),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |row| RowRef { table: self, row })
    }

    /// 按条件筛选，返回行号
    pub fn select(&self, predicate: &RowPredicate) -> ContextResult<Vec<usize>> {
        predicate.check_columns(self)?;
        Ok(self
            .rows()
            .enumerate()
            .filter(|(_, row)| predicate.matches(row))
            .map(|(i, _)| i)
            .collect())
    }

    /// 列求和，忽略 Null；无可加值时返回 None
    pub fn sum(&self, column: &str) -> ContextResult<Option<Decimal>> {
        let mut total: Option<Decimal> = None;
        for row in self.rows() {
            if let Some(v) = row.opt_decimal(column)? {
                total = Some(total.unwrap_or(Decimal::ZERO) + v);
            }
        }
        // 空表也要校验列存在
        self.column_index(column)?;
        Ok(total)
    }
}

// ==========================================
// DataSet
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    tables: Vec<DataTable>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: DataTable) -> ContextResult<()> {
        if self.tables.iter().any(|t| t.name == table.name) {
            return Err(ContextError::DuplicateTable(table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn table(&self, name: &str) -> ContextResult<&DataTable> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ContextError::TableNotFound {
                table: name.to_string(),
            })
    }

    pub fn table_mut(&mut self, name: &str) -> ContextResult<&mut DataTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| ContextError::TableNotFound {
                table: name.to_string(),
            })
    }

    pub fn tables(&self) -> impl Iterator<Item = &DataTable> {
        self.tables.iter()
    }
}
