// ==========================================
// P21 业务规则 - 屏蔽表头交货日期同步提示
// ==========================================
// 类型: On Event
// 事件: Message Box Opening
// 传入表: MessageBoxData（message_no / user_text / suppress_message / default_button）
// ==========================================
// 逻辑:
// - 消息号与完整消息文本同时命中才处理，避免误伤其他消息框
// - suppress_message = 'Y' 时宿主直接采用 default_button；
//   该消息默认按钮为 2 (No)，因此同时改为 1 (Yes)
// ==========================================

use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::table::RowAccess;
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};

pub const MESSAGE_BOX_TABLE: &str = "MessageBoxData";
pub const EXPEDITE_DATE_MESSAGE_NO: &str = "9656";
pub const EXPEDITE_DATE_MESSAGE_TEXT: &str =
    "Would you like to update the line items to the new expedite date?";

/// 消息框按钮：Yes
const YES_BUTTON: i64 = 1;

#[derive(Debug, Clone, Default)]
pub struct SuppressExpediteDateMessage;

impl Rule for SuppressExpediteDateMessage {
    fn name(&self) -> &str {
        "SuppressOEExpediteDateMessage"
    }

    fn description(&self) -> &str {
        "Suppresses messaging prompting whether to copy the header expedite date to all lines in \
         OE after the header expedite date value is changed. Defaults answer to 'Yes'"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::OnEvent
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let table = ctx.data.table_mut(MESSAGE_BOX_TABLE)?;
        let mut row = table.row_mut(0)?;

        let message_no = row.string("message_no")?;
        let user_text = row.string("user_text")?;

        if message_no != EXPEDITE_DATE_MESSAGE_NO
            || user_text.trim().is_empty()
            || user_text != EXPEDITE_DATE_MESSAGE_TEXT
        {
            return Ok(RuleResult::success());
        }

        row.set("suppress_message", "Y")?;
        row.set("default_button", YES_BUTTON)?;
        tracing::debug!(message_no = %message_no, "expedite date message suppressed");

        Ok(RuleResult::success())
    }
}
