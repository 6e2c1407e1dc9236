// ==========================================
// P21 业务规则 - Rule 契约
// ==========================================
// 职责: 宿主固定的规则接口（名称/描述/执行）
// 红线: name/description 无副作用；execute 是唯一有副作用的操作
// ==========================================

use crate::api::error::RuleError;
use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::RuleKind;

/// 规则执行结果：校验结论走 Ok，非预期错误走 Err
pub type RuleOutcome = Result<RuleResult, RuleError>;

// ==========================================
// Rule Trait
// ==========================================
// 调用方: RuleRunner（唯一的错误边界）
pub trait Rule: Send + Sync {
    /// 稳定标识
    fn name(&self) -> &str;

    /// 面向用户的说明
    fn description(&self) -> &str;

    /// 触发类型
    fn kind(&self) -> RuleKind;

    /// 执行规则
    ///
    /// 出错前已做的修改保留在上下文中，由宿主决定是否丢弃
    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome;
}
