// ==========================================
// 规则上下文构建器 - 用于集成测试
// ==========================================

use p21_business_rules::domain::{
    Column, ColumnType, DataField, DataTable, RuleContext, RuleData, RuleLog, RuleState, Session,
    Value,
};
use rust_decimal::Decimal;

pub const ORDER_LINE_TABLE: &str = "d_dw_oe_line_dataentry";
pub const ORDER_HEADER_TABLE: &str = "d_oe_header";
pub const LINE_EXTENDED_INFO_TABLE: &str = "d_oe_line_extended_info";

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

// ==========================================
// 订单（多行）构建器
// ==========================================

struct OrderLine {
    item_id: String,
    unit_price: Decimal,
    unit_quantity: Decimal,
    allocated_qty: Decimal,
    quantity_available: Decimal,
}

pub struct OrderContextBuilder {
    lines: Vec<OrderLine>,
    discount_pct: Option<Decimal>,
    trigger_row: Option<usize>,
    log: RuleLog,
}

impl OrderContextBuilder {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            discount_pct: None,
            trigger_row: None,
            log: RuleLog::in_memory(),
        }
    }

    /// 订单行；默认未分配、库存充足
    pub fn line(mut self, item_id: &str, unit_price: &str, unit_quantity: &str) -> Self {
        self.lines.push(OrderLine {
            item_id: item_id.to_string(),
            unit_price: dec(unit_price),
            unit_quantity: dec(unit_quantity),
            allocated_qty: Decimal::ZERO,
            quantity_available: dec("100000"),
        });
        self
    }

    /// 设置最后一行的分配量与可用量
    pub fn stock(mut self, allocated_qty: &str, quantity_available: &str) -> Self {
        if let Some(line) = self.lines.last_mut() {
            line.allocated_qty = dec(allocated_qty);
            line.quantity_available = dec(quantity_available);
        }
        self
    }

    pub fn discount_pct(mut self, pct: &str) -> Self {
        self.discount_pct = Some(dec(pct));
        self
    }

    pub fn trigger_row(mut self, row: usize) -> Self {
        self.trigger_row = Some(row);
        self
    }

    pub fn log(mut self, log: RuleLog) -> Self {
        self.log = log;
        self
    }

    pub fn build(self) -> RuleContext {
        let total: Decimal = self
            .lines
            .iter()
            .map(|l| l.unit_price * l.unit_quantity)
            .sum();

        let mut order_lines = DataTable::new(
            ORDER_LINE_TABLE,
            vec![
                Column::new("item_id", ColumnType::Text),
                Column::new("unit_price", ColumnType::Decimal),
                Column::new("unit_quantity", ColumnType::Decimal),
                Column::new("extended_price", ColumnType::Decimal),
                Column::new("extended_price_total", ColumnType::Decimal),
            ],
        );
        let mut ext_info = DataTable::new(
            LINE_EXTENDED_INFO_TABLE,
            vec![
                Column::new("allocated_qty", ColumnType::Decimal),
                Column::new("disposition", ColumnType::Text),
                Column::new("quantity_available", ColumnType::Decimal),
                Column::new("unit_quantity", ColumnType::Decimal),
            ],
        );

        for line in &self.lines {
            order_lines
                .load_row([
                    ("item_id", Value::from(line.item_id.as_str())),
                    ("unit_price", Value::from(line.unit_price)),
                    ("unit_quantity", Value::from(line.unit_quantity)),
                    ("extended_price", Value::from(line.unit_price * line.unit_quantity)),
                    ("extended_price_total", Value::from(total)),
                ])
                .unwrap();
            ext_info
                .load_row([
                    ("allocated_qty", Value::from(line.allocated_qty)),
                    ("disposition", Value::Null),
                    ("quantity_available", Value::from(line.quantity_available)),
                    ("unit_quantity", Value::from(line.unit_quantity)),
                ])
                .unwrap();
        }

        let mut header = DataTable::new(
            ORDER_HEADER_TABLE,
            vec![Column::new("discount_pct", ColumnType::Decimal)],
        );
        header
            .load_row([("discount_pct", Value::from(self.discount_pct))])
            .unwrap();

        let mut data = RuleData::new()
            .with_table(order_lines)
            .unwrap()
            .with_table(ext_info)
            .unwrap()
            .with_table(header)
            .unwrap();
        data.trigger_row = self.trigger_row;

        RuleContext::new(data, Session::default(), RuleState::multi_row(), self.log)
    }
}

// ==========================================
// 单行上下文
// ==========================================

/// Items 页单行字段（extended_price / unit_quantity / allocated_qty / disposition）
pub fn order_line_fields(
    extended_price: Option<&str>,
    unit_quantity: Option<&str>,
    allocated_qty: Option<&str>,
) -> RuleContext {
    let data = RuleData::new()
        .with_field(DataField::new(ORDER_LINE_TABLE, "extended_price", extended_price))
        .with_field(DataField::new(ORDER_LINE_TABLE, "unit_quantity", unit_quantity))
        .with_field(DataField::new(ORDER_LINE_TABLE, "allocated_qty", allocated_qty))
        .with_field(DataField::new(ORDER_LINE_TABLE, "disposition", None))
        .with_field(DataField::new(ORDER_LINE_TABLE, "unit_price", Some("10")))
        .with_field(
            DataField::new(ORDER_LINE_TABLE, "oe_order_item_id", Some("WIDGET")).with_alias("item_id"),
        );
    RuleContext::local(data, RuleState::single_row())
}

/// 单个字段的值（Null 读为空串）
pub fn field_value(ctx: &RuleContext, alias: &str) -> String {
    ctx.data.fields.get(alias).unwrap().value_or_empty().to_string()
}

/// 订单行表某行某列
pub fn line_decimal(ctx: &RuleContext, table: &str, row: usize, column: &str) -> Decimal {
    use p21_business_rules::domain::RowAccess;
    ctx.data
        .table(table)
        .unwrap()
        .row(row)
        .unwrap()
        .decimal(column)
        .unwrap()
}

pub fn line_text(ctx: &RuleContext, table: &str, row: usize, column: &str) -> String {
    use p21_business_rules::domain::RowAccess;
    ctx.data
        .table(table)
        .unwrap()
        .row(row)
        .unwrap()
        .string(column)
        .unwrap()
}
