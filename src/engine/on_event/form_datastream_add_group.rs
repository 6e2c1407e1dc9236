// ==========================================
// P21 业务规则 - 表单数据流追加明细组
// ==========================================
// 类型: On Event
// 事件: Form Datastream Created（发票）
// ==========================================
// 逻辑:
// - 修改第一个表头 CARRIERDEF 组的 XCARRIER_NAME
// - 每个表头追加 HDRTSTXDEF 组，每行追加 LINETSTDEF 组
// - 写回数据流来源文件
// ==========================================

use crate::domain::context::RuleContext;
use crate::domain::datastream::{Element, XmlDatastream};
use crate::domain::error::DatastreamError;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};

pub const CARRIER_GROUP: &str = "CARRIERDEF";
pub const CARRIER_NAME_ELEMENT: &str = "XCARRIER_NAME";
pub const MODIFIED_CARRIER_NAME: &str = "Modified Carrier Name";
pub const HEADER_TEST_GROUP: &str = "HDRTSTXDEF";
pub const LINE_TEST_GROUP: &str = "LINETSTDEF";

#[derive(Debug, Clone, Default)]
pub struct FormDatastreamAddGroup;

fn header_test_group(invoice_no: Option<&str>) -> Element {
    Element::new(HEADER_TEST_GROUP)
        .with_child(Element::with_text("TEST_TEXT", Some("Header Test Text")))
        .with_child(Element::with_text("INVOICE_NO", invoice_no))
}

fn line_test_group(item_id: Option<&str>) -> Element {
    Element::new(LINE_TEST_GROUP)
        .with_child(Element::with_text("TEST_TEXT", Some("Line Test Text")))
        .with_child(Element::with_text("ITEM_ID", item_id))
}

impl Rule for FormDatastreamAddGroup {
    fn name(&self) -> &str {
        "FormDatastream_AddGroup"
    }

    fn description(&self) -> &str {
        "Adds a detail group to invoice headers and lines in the datastream."
    }

    fn kind(&self) -> RuleKind {
        RuleKind::OnEvent
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let ds = ctx.data.datastream_mut()?;

        // 第一个表头的承运商名称
        let headers = ds.headers();
        let first = headers
            .first()
            .copied()
            .ok_or_else(|| DatastreamError::MissingElement(ds.layout().header_tag.clone()))?;
        let first_header = ds.header_mut(first)?;
        for carrier in XmlDatastream::groups_mut(first_header, CARRIER_GROUP) {
            carrier
                .element_mut(CARRIER_NAME_ELEMENT)
                .ok_or_else(|| DatastreamError::MissingElement(CARRIER_NAME_ELEMENT.to_string()))?
                .set_text(MODIFIED_CARRIER_NAME);
        }

        for node in headers {
            let header = ds.header_mut(node)?;
            let invoice_no = header.element_value("INVOICE_NUMBER");
            XmlDatastream::add_group(header, header_test_group(invoice_no.as_deref()));
        }

        let lines = ds.lines();
        for &node in &lines {
            let line = ds.line_mut(node)?;
            let item_id = line.element_value("INVOICE_LINE_ITEM_ID");
            XmlDatastream::add_group(line, line_test_group(item_id.as_deref()));
        }

        ds.save()?;
        tracing::info!(lines = lines.len(), "detail groups added to datastream");

        Ok(RuleResult::success())
    }
}
