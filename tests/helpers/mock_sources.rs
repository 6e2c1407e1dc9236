// ==========================================
// 排序组查询替身 - 用于集成测试
// ==========================================

use p21_business_rules::domain::Session;
use p21_business_rules::repository::{
    InvoiceSortGroupRow, InvoiceSortGroupSource, RepositoryError, RepositoryResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// 固定结果，按 invoice_no 过滤；记录调用次数
#[derive(Default)]
pub struct StaticSortGroups {
    rows: Vec<InvoiceSortGroupRow>,
    calls: Arc<AtomicUsize>,
}

impl StaticSortGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group(mut self, invoice_no: &str, line_no: i64, group: i64) -> Self {
        self.rows.push(InvoiceSortGroupRow {
            invoice_no: invoice_no.to_string(),
            line_no,
            invoice_sort_group: group,
        });
        self
    }

    /// 调用计数句柄（规则持有 Box 后仍可读取）
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl InvoiceSortGroupSource for StaticSortGroups {
    fn sort_groups(
        &self,
        _session: &Session,
        invoice_no: &str,
    ) -> RepositoryResult<Vec<InvoiceSortGroupRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .iter()
            .filter(|r| r.invoice_no == invoice_no)
            .cloned()
            .collect())
    }
}

/// 总是连接失败
pub struct OfflineSortGroups;

impl InvoiceSortGroupSource for OfflineSortGroups {
    fn sort_groups(&self, session: &Session, _: &str) -> RepositoryResult<Vec<InvoiceSortGroupRow>> {
        Err(RepositoryError::DatabaseConnectionError(format!(
            "cannot reach {}",
            session.server
        )))
    }
}
