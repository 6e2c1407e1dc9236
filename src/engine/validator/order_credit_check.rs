// ==========================================
// P21 业务规则 - 订单信用检查（多行）
// ==========================================
// 窗口: Order Entry Items 页；触发: unit_quantity
// 类型: Validator，多行
// 传入字段:
//   d_dw_oe_line_dataentry  extended_price / item_id / unit_price
//   d_oe_line_extended_info allocated_qty / disposition / quantity_available / unit_quantity
// ==========================================
// 逻辑:
// - 订单行 extended_price 合计 >= 信用额度：数量 > 0 的行分配量清零并挂起 (H)
// - 否则：分配量对齐订购量，不超过 可用 + 已分配；被截断的行改为缺货 (B)
// - 先写 allocated_qty 再写 disposition（宿主按代码顺序回写）
// - 执行后焦点放到触发行的 unit_price
// ==========================================

use crate::config::RuleConfig;
use crate::domain::context::RuleContext;
use crate::domain::error::ContextError;
use crate::domain::rule_result::RuleResult;
use crate::domain::table::RowAccess;
use crate::domain::types::{Disposition, RuleKind};
use crate::engine::rule::{Rule, RuleOutcome};
use rust_decimal::Decimal;

pub const ORDER_LINE_TABLE: &str = "d_dw_oe_line_dataentry";
pub const LINE_EXTENDED_INFO_TABLE: &str = "d_oe_line_extended_info";

pub struct OrderCreditCheck {
    credit_limit: Decimal,
}

impl OrderCreditCheck {
    pub fn new(config: &RuleConfig) -> Self {
        Self {
            credit_limit: config.credit_limit,
        }
    }
}

impl Default for OrderCreditCheck {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}

/// 未挂起时的目标分配量；需要改为缺货时返回 true
pub fn allocation_target(unit_qty: Decimal, allocated_qty: Decimal, available_qty: Decimal) -> (Decimal, bool) {
    let ceiling = available_qty + allocated_qty;
    if unit_qty > ceiling {
        (ceiling, true)
    } else {
        (unit_qty, false)
    }
}

impl Rule for OrderCreditCheck {
    fn name(&self) -> &str {
        "OrderCreditCheck"
    }

    fn description(&self) -> &str {
        "Order Credit Check"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Validator
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        if !ctx.rule_state.multi_row {
            return Ok(RuleResult::success());
        }

        let data = &mut ctx.data;

        // 空订单或全为 Null 时无法得出合计
        let total_price = data
            .table(ORDER_LINE_TABLE)?
            .sum("extended_price")?
            .ok_or_else(|| ContextError::NullValue {
                column: "extended_price".to_string(),
            })?;

        let ext_info = data.table_mut(LINE_EXTENDED_INFO_TABLE)?;
        let hold = total_price >= self.credit_limit;
        tracing::debug!(%total_price, credit_limit = %self.credit_limit, hold, "order total checked");

        for index in 0..ext_info.len() {
            let mut row = ext_info.row_mut(index)?;
            let unit_qty = row.decimal("unit_quantity")?;

            if hold {
                if unit_qty <= Decimal::ZERO {
                    continue;
                }
                row.set("allocated_qty", Decimal::new(0, 1))?;
                row.set("disposition", Disposition::Hold.code())?;
                continue;
            }

            let allocated_qty = row.decimal("allocated_qty")?;
            let available_qty = row.decimal("quantity_available")?;
            let (target, backorder) = allocation_target(unit_qty, allocated_qty, available_qty);

            if backorder {
                row.set("disposition", Disposition::Backorder.code())?;
            }
            if target != allocated_qty {
                row.set("allocated_qty", target)?;
            }
        }

        let trigger_row = data.trigger_row;
        data.set_focus("unit_price", trigger_row);

        Ok(RuleResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::RuleData;
    use crate::domain::session::RuleState;
    use crate::domain::table::{Column, DataTable};
    use crate::domain::types::{ColumnType, Value};

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    /// lines: (extended_price, unit_quantity, allocated_qty, quantity_available)
    fn context(lines: &[(i64, i64, i64, i64)], state: RuleState) -> RuleContext {
        let mut order_lines = DataTable::new(ORDER_LINE_TABLE, vec![Column::new("extended_price", ColumnType::Decimal)]);
        let mut ext_info = DataTable::new(
            LINE_EXTENDED_INFO_TABLE,
            vec![
                Column::new("allocated_qty", ColumnType::Decimal),
                Column::new("disposition", ColumnType::Text),
                Column::new("quantity_available", ColumnType::Decimal),
                Column::new("unit_quantity", ColumnType::Decimal),
            ],
        );
        for (price, unit, allocated, available) in lines {
            order_lines.load_row([("extended_price", d(*price))]).unwrap();
            ext_info
                .load_row([
                    ("allocated_qty", Value::from(d(*allocated))),
                    ("disposition", Value::Null),
                    ("quantity_available", Value::from(d(*available))),
                    ("unit_quantity", Value::from(d(*unit))),
                ])
                .unwrap();
        }

        let data = RuleData::new()
            .with_table(order_lines)
            .unwrap()
            .with_table(ext_info)
            .unwrap()
            .with_trigger_row(0);
        RuleContext::local(data, state)
    }

    #[test]
    fn test_allocation_target() {
        assert_eq!(allocation_target(d(5), d(0), d(10)), (d(5), false));
        assert_eq!(allocation_target(d(8), d(2), d(3)), (d(5), true));
        assert_eq!(allocation_target(d(5), d(2), d(3)), (d(5), false));
    }

    #[test]
    fn test_over_limit_holds_lines_with_quantity() {
        let mut ctx = context(&[(800, 4, 4, 10), (300, 0, 0, 10)], RuleState::multi_row());
        let result = OrderCreditCheck::default().execute(&mut ctx).unwrap();
        assert!(result.success);

        let ext = ctx.data.table(LINE_EXTENDED_INFO_TABLE).unwrap();
        let first = ext.row(0).unwrap();
        assert_eq!(first.decimal("allocated_qty").unwrap(), Decimal::ZERO);
        assert_eq!(first.string("disposition").unwrap(), "H");
        assert_eq!(first.modified_columns(), ["allocated_qty", "disposition"]);

        let second = ext.row(1).unwrap();
        assert!(second.modified_columns().is_empty());
    }

    #[test]
    fn test_under_limit_caps_and_backorders() {
        let mut ctx = context(&[(200, 8, 2, 3), (100, 5, 0, 10), (50, 3, 3, 10)], RuleState::multi_row());
        OrderCreditCheck::default().execute(&mut ctx).unwrap();

        let ext = ctx.data.table(LINE_EXTENDED_INFO_TABLE).unwrap();
        let capped = ext.row(0).unwrap();
        assert_eq!(capped.decimal("allocated_qty").unwrap(), d(5));
        assert_eq!(capped.string("disposition").unwrap(), "B");
        assert_eq!(capped.modified_columns(), ["disposition", "allocated_qty"]);

        let aligned = ext.row(1).unwrap();
        assert_eq!(aligned.decimal("allocated_qty").unwrap(), d(5));
        assert_eq!(aligned.string("disposition").unwrap(), "");

        assert!(ext.row(2).unwrap().modified_columns().is_empty());
    }

    #[test]
    fn test_focus_on_trigger_row() {
        let mut ctx = context(&[(200, 1, 1, 1)], RuleState::multi_row());
        OrderCreditCheck::default().execute(&mut ctx).unwrap();
        let focus = ctx.data.focus().unwrap();
        assert_eq!(focus.field, "unit_price");
        assert_eq!(focus.row, Some(0));
    }

    #[test]
    fn test_single_row_call_is_noop() {
        let mut ctx = context(&[(5000, 4, 4, 10)], RuleState::single_row());
        let result = OrderCreditCheck::default().execute(&mut ctx).unwrap();
        assert!(result.success);
        assert!(ctx.data.focus().is_none());
        let ext = ctx.data.table(LINE_EXTENDED_INFO_TABLE).unwrap();
        assert!(ext.row(0).unwrap().modified_columns().is_empty());
    }

    #[test]
    fn test_empty_order_is_error() {
        let mut ctx = context(&[], RuleState::multi_row());
        let err = OrderCreditCheck::default().execute(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("extended_price"));
    }
}
