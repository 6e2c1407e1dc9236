// ==========================================
// P21 业务规则 - 发票行排序组查询
// ==========================================
// 职责: 读取物料自定义字段 invoice_sort_group（只读）
// 说明: 表单数据流事件在宿主进程外触发，需自行按会话信息建立连接
// ==========================================

use crate::db::open_sqlite_read_only;
use crate::domain::session::Session;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::params;
use std::path::PathBuf;

/// 物料未设置排序组时的默认值（排到最后）
pub const DEFAULT_INVOICE_SORT_GROUP: i64 = 9999;

/// 查询每个发票行的排序组
///
/// invoice_no 以参数绑定，不拼接进 SQL
pub const INVOICE_SORT_GROUP_SQL: &str = r#"
SELECT  CAST(p21_view_invoice_line.invoice_no AS TEXT) AS invoice_no
      , p21_view_invoice_line.line_no
      , COALESCE(inv_mast_ud.invoice_sort_group, 9999) AS invoice_sort_group
FROM    p21_view_invoice_line
LEFT JOIN inv_mast_ud ON inv_mast_ud.inv_mast_uid = p21_view_invoice_line.inv_mast_uid
WHERE   p21_view_invoice_line.invoice_no = ?1
"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceSortGroupRow {
    pub invoice_no: String,
    pub line_no: i64,
    pub invoice_sort_group: i64,
}

// ==========================================
// InvoiceSortGroupSource Trait
// ==========================================
// 实现者: SqliteInvoiceSortGroupRepository；测试中可替换
pub trait InvoiceSortGroupSource: Send + Sync {
    /// 查询一张发票全部行的排序组
    fn sort_groups(
        &self,
        session: &Session,
        invoice_no: &str,
    ) -> RepositoryResult<Vec<InvoiceSortGroupRow>>;
}

// ==========================================
// SqliteInvoiceSortGroupRepository
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SqliteInvoiceSortGroupRepository {
    /// 固定数据库路径；None 时使用 Session::database
    db_path: Option<PathBuf>,
}

impl SqliteInvoiceSortGroupRepository {
    /// 按会话定位数据库
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: Into<PathBuf>>(db_path: P) -> Self {
        Self {
            db_path: Some(db_path.into()),
        }
    }

    fn resolve_path(&self, session: &Session) -> RepositoryResult<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        let database = session.database.trim();
        if database.is_empty() {
            return Err(RepositoryError::DatabaseConnectionError(
                "session does not name a database".to_string(),
            ));
        }
        Ok(PathBuf::from(database))
    }
}

impl InvoiceSortGroupSource for SqliteInvoiceSortGroupRepository {
    fn sort_groups(
        &self,
        session: &Session,
        invoice_no: &str,
    ) -> RepositoryResult<Vec<InvoiceSortGroupRow>> {
        let path = self.resolve_path(session)?;
        tracing::debug!(
            db = %path.display(),
            session = %session.connection_label(),
            invoice_no,
            "querying invoice sort groups"
        );

        let conn = open_sqlite_read_only(&path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        let mut stmt = conn.prepare(INVOICE_SORT_GROUP_SQL)?;
        let rows = stmt.query_map(params![invoice_no], |row| {
            Ok(InvoiceSortGroupRow {
                invoice_no: row.get(0)?,
                line_no: row.get(1)?,
                invoice_sort_group: row.get(2)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
