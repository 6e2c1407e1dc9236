// ==========================================
// P21 业务规则 - 订单行信用检查（单行）
// ==========================================
// 窗口: Order Entry Items 页；触发: unit_quantity
// 类型: Validator，单行
// 传入字段 (d_dw_oe_line_dataentry):
//   allocated_qty / disposition / extended_price / item_id / unit_price / unit_quantity
// 说明: allocated_qty 需通过 Field Chooser 加到 Items 页，
//       否则回写不会落到正确的行
// ==========================================
// 逻辑:
// - 行金额 >= 信用额度且订购量 > 0：分配量置 0.0 并挂起 (H)
// - 否则：分配量对齐订购量
// - 显式指定回写顺序（allocated_qty 先于 disposition）
// - 执行后焦点放到 unit_price
// ==========================================

use crate::config::RuleConfig;
use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::{Disposition, RuleKind};
use crate::engine::rule::{Rule, RuleOutcome};
use rust_decimal::Decimal;

pub struct OrderLineCreditCheck {
    credit_limit: Decimal,
}

impl OrderLineCreditCheck {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            credit_limit: config.credit_limit,
        }
    }
}

impl Default for OrderLineCreditCheck {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}

impl Rule for OrderLineCreditCheck {
    fn name(&self) -> &str {
        "OrderLineCreditCheck"
    }

    fn description(&self) -> &str {
        "Order Line Credit Check"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Validator
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        if ctx.rule_state.multi_row {
            return Ok(RuleResult::success());
        }

        let data = &mut ctx.data;
        let mut update_sequence: Vec<String> = Vec::new();

        let line_price = data.fields.get("extended_price")?.decimal_or_zero()?;

        if line_price >= self.credit_limit {
            // 无法解析的数量不能证明 <= 0，照样挂起
            let known_empty = matches!(
                data.fields.get("unit_quantity")?.decimal_or_zero(),
                Ok(qty) if qty <= Decimal::ZERO
            );
            if !known_empty {
                data.fields.set_value("allocated_qty", "0.0")?;
                update_sequence.push("allocated_qty".to_string());
                data.fields.set_value("disposition", Disposition::Hold.code())?;
                update_sequence.push("disposition".to_string());
            }
        } else {
            let unit_qty = data.fields.get("unit_quantity")?.decimal_or_zero()?;
            let allocated_qty = data.fields.get("allocated_qty")?.decimal_or_zero()?;

            if unit_qty != allocated_qty {
                data.fields.set_value("allocated_qty", &unit_qty.to_string())?;
                update_sequence.push("allocated_qty".to_string());
            }
        }

        tracing::debug!(%line_price, updates = ?update_sequence, "order line checked");

        data.set_focus("unit_price", None);
        data.set_field_update_order(update_sequence);

        Ok(RuleResult::success())
    }
}
