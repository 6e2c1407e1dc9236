// ==========================================
// 校验器规则（字段变更触发，可改写数据）
// ==========================================

pub mod order_credit_check;
pub mod order_line_credit_check;

pub use order_credit_check::{allocation_target, OrderCreditCheck};
pub use order_line_credit_check::OrderLineCreditCheck;
