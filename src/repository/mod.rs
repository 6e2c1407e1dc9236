// ==========================================
// P21 业务规则 - 数据仓储层
// ==========================================
// 职责: 规则所需、但上下文未提供的辅助数据的只读查询
// ==========================================

pub mod error;
pub mod invoice_sort_group_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use invoice_sort_group_repo::{
    InvoiceSortGroupRow, InvoiceSortGroupSource, SqliteInvoiceSortGroupRepository,
    DEFAULT_INVOICE_SORT_GROUP, INVOICE_SORT_GROUP_SQL,
};
