// ==========================================
// P21 业务规则示例 - 核心库
// ==========================================
// 宿主: Prophet 21 ERP 业务规则扩展点
// 技术栈: Rust + SQLite + quick-xml
// 定位: 宿主触发、同步执行的规则集合（校验/改写/事件处理）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据上下文模型
pub mod domain;

// 数据仓储层 - 辅助查询
pub mod repository;

// 规则层 - Rule 契约与规则实现
pub mod engine;

// 配置层 - 规则参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 调用层 - 错误边界
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 数据上下文
pub use domain::{
    Column, ColumnType, DataField, DataSet, DataTable, Disposition, Element, RowAccess,
    RowPredicate, RuleContext, RuleData, RuleKind, RuleLog, RuleResult, RuleState, Session,
    SortOrder, Value, XmlDatastream,
};

// 规则
pub use engine::{
    default_rules, AddNewRowForDiscount, FormDatastreamAddGroup, FormDatastreamSortInvoiceLines,
    OrderCreditCheck, OrderLineCreditCheck, OrderUpdatedEvent, Rule, RuleOutcome,
    SuppressExpediteDateMessage, ValidDatetime, ValidUrl,
};

// 配置
pub use config::{ConfigManager, RuleConfig};

// 调用
pub use api::{RuleError, RuleErrorKind, RuleReport, RuleRunner};

// ==========================================
// 常量定义
// ==========================================

// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 库名称
pub const APP_NAME: &str = "P21 Business Rule Examples";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_catalog_reachable_from_root() {
        assert_eq!(default_rules(&RuleConfig::default()).len(), 9);
    }
}
