// ==========================================
// P21 业务规则 - 规则层
// ==========================================
// 职责: Rule 契约与九个示例规则
// 红线: 规则不直接拼 SQL；辅助数据走 repository 层
// ==========================================

pub mod catalog;
pub mod general;
pub mod on_demand;
pub mod on_event;
pub mod rule;
pub mod validator;

// 重导出规则契约与全部规则
pub use catalog::{default_rules, find_rule};
pub use general::{ValidDatetime, ValidUrl};
pub use on_demand::AddNewRowForDiscount;
pub use on_event::{
    FormDatastreamAddGroup, FormDatastreamSortInvoiceLines, OrderUpdatedEvent,
    SuppressExpediteDateMessage,
};
pub use rule::{Rule, RuleOutcome};
pub use validator::{OrderCreditCheck, OrderLineCreditCheck};
