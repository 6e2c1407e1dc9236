// ==========================================
// P21 业务规则 - 订单折扣行
// ==========================================
// 窗口: Order Entry；触发: 订单表头自定义按钮
// 类型: On Demand，多行
// 传入字段:
//   d_oe_header            discount_pct（用户自定义折扣百分比）
//   d_dw_oe_line_dataentry item_id / unit_price / unit_quantity / extended_price_total
// ==========================================
// 逻辑:
// - 订单总额 > 0 且折扣百分比 > 0 时才处理
// - 折扣行不存在：新增一行，数量 1，单价为负的折扣额
// - 折扣行已存在：先从总额中扣回旧折扣，再按新折扣额更新单价
// ==========================================

use crate::config::RuleConfig;
use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::table::{RowAccess, RowPredicate};
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};
use rust_decimal::Decimal;

pub const ORDER_LINE_TABLE: &str = "d_dw_oe_line_dataentry";
pub const ORDER_HEADER_TABLE: &str = "d_oe_header";

pub struct AddNewRowForDiscount {
    discount_item_id: String,
}

impl AddNewRowForDiscount {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            discount_item_id: config.discount_item_id.clone(),
        }
    }
}

impl Default for AddNewRowForDiscount {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}

/// 折扣额 = 总额 × 百分比 / 100
pub fn discount_amount(order_total: Decimal, discount_pct: Decimal) -> Decimal {
    order_total * (discount_pct / Decimal::ONE_HUNDRED)
}

impl Rule for AddNewRowForDiscount {
    fn name(&self) -> &str {
        "AddNewRowForDiscount"
    }

    fn description(&self) -> &str {
        "AddNewRowForDiscount"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::OnDemand
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let data = &mut ctx.data;

        // 总额取第一行的 extended_price_total
        let mut order_total = data
            .table(ORDER_LINE_TABLE)?
            .row(0)?
            .decimal("extended_price_total")?;

        let discount_pct = data
            .table(ORDER_HEADER_TABLE)?
            .row(0)?
            .opt_decimal("discount_pct")?
            .unwrap_or(Decimal::ZERO);

        if order_total <= Decimal::ZERO || discount_pct <= Decimal::ZERO {
            tracing::debug!(%order_total, %discount_pct, "no discount to apply");
            return Ok(RuleResult::success());
        }

        let existing = data
            .table(ORDER_LINE_TABLE)?
            .select(&RowPredicate::eq("item_id", self.discount_item_id.as_str()))?;

        let discount_row = match existing.first() {
            Some(&index) => {
                // 扣回上次的折扣后再计算
                let previous_price = data
                    .table(ORDER_LINE_TABLE)?
                    .row(index)?
                    .opt_decimal("unit_price")?
                    .unwrap_or(Decimal::ZERO);
                order_total += -previous_price;
                index
            }
            None => {
                let index = data.add_new_row(ORDER_LINE_TABLE)?;
                let lines = data.table_mut(ORDER_LINE_TABLE)?;
                let mut row = lines.row_mut(index)?;
                row.set("item_id", self.discount_item_id.as_str())?;
                row.set("unit_quantity", Decimal::ONE)?;
                index
            }
        };

        let discount = discount_amount(order_total, discount_pct);
        data.table_mut(ORDER_LINE_TABLE)?
            .row_mut(discount_row)?
            .set("unit_price", -discount)?;

        tracing::info!(
            row = discount_row,
            %order_total,
            %discount_pct,
            %discount,
            "order discount applied"
        );
        Ok(RuleResult::success())
    }
}
