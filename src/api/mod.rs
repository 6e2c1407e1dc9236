// ==========================================
// P21 业务规则 - 调用层
// ==========================================
// 职责: 宿主调用入口；统一错误类型与错误边界
// ==========================================

pub mod error;
pub mod rule_runner;

// 重导出核心类型
pub use error::{RuleError, RuleErrorKind};
pub use rule_runner::{RuleReport, RuleRunner};
