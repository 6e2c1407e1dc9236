// ==========================================
// P21 业务规则 - 订单更新事件通知
// ==========================================
// 类型: On Event
// 事件: Order Updated
// 传入表: OrderHeader（key_value = 订单号，action = ADD / UPDATE）
// ==========================================
// 说明: 变更已提交到数据库，后续工作流可按订单号自行查询
// ==========================================

use crate::config::RuleConfig;
use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::table::RowAccess;
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};
use std::path::{Path, PathBuf};

pub const ORDER_HEADER_TABLE: &str = "OrderHeader";

pub struct OrderUpdatedEvent {
    output_path: PathBuf,
}

impl OrderUpdatedEvent {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            output_path: config.order_updated_output_path.clone(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

impl Default for OrderUpdatedEvent {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}

/// 通知文件内容
pub fn notification_text(key_value: &str, action: &str) -> String {
    format!("Order: {}\nAction: {}\n", key_value, action)
}

impl Rule for OrderUpdatedEvent {
    fn name(&self) -> &str {
        "OrderUpdatedEvent"
    }

    fn description(&self) -> &str {
        "Order Updated Event"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::OnEvent
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let header = ctx.data.table(ORDER_HEADER_TABLE)?.row(0)?;
        let key_value = header.string("key_value")?;
        let action = header.string("action")?;

        std::fs::write(&self.output_path, notification_text(&key_value, &action))?;
        tracing::info!(
            order = %key_value,
            action = %action,
            path = %self.output_path.display(),
            "order update notification written"
        );

        Ok(RuleResult::success())
    }
}
