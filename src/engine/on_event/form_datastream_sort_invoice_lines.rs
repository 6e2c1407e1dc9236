// ==========================================
// P21 业务规则 - 发票行按排序组重排
// ==========================================
// 类型: On Event
// 事件: Form Datastream Created（发票）
// ==========================================
// 逻辑:
// - 逐个表单按表头 INVOICE_NUMBER 查询各行的 invoice_sort_group
// - 每行追加 INVOICE_SORT_GROUP（未命中或查询失败时用默认值）
// - 全部行按 INVOICE_SORT_GROUP 数值升序排序后写回
// 说明: 打印预览时一个文件含多张发票；实际打印时只有一张
// ==========================================

use crate::config::RuleConfig;
use crate::domain::context::RuleContext;
use crate::domain::datastream::Element;
use crate::domain::error::DatastreamError;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::{RuleKind, SortOrder};
use crate::engine::rule::{Rule, RuleOutcome};
use crate::repository::{InvoiceSortGroupRow, InvoiceSortGroupSource, SqliteInvoiceSortGroupRepository};

pub const INVOICE_SORT_GROUP_ELEMENT: &str = "INVOICE_SORT_GROUP";

pub struct FormDatastreamSortInvoiceLines {
    source: Box<dyn InvoiceSortGroupSource>,
    default_group: i64,
}

impl FormDatastreamSortInvoiceLines {
    /// 使用会话指向的 SQLite 数据库
    pub fn new(config: &RuleConfig) -> Self {
        Self::with_source(Box::new(SqliteInvoiceSortGroupRepository::new()), config)
    }

    pub fn with_source(source: Box<dyn InvoiceSortGroupSource>, config: &RuleConfig) -> Self {
        Self {
            source,
            default_group: config.default_invoice_sort_group,
        }
    }
}

/// 恰好一行匹配 (invoice_no, line_no) 时才采用查询结果
pub fn resolve_sort_group(
    rows: &[InvoiceSortGroupRow],
    invoice_no: &str,
    line_no: Option<&str>,
    default_group: i64,
) -> i64 {
    let Some(line_no) = line_no.and_then(|s| s.trim().parse::<i64>().ok()) else {
        return default_group;
    };
    let mut matches = rows
        .iter()
        .filter(|r| r.invoice_no == invoice_no && r.line_no == line_no);
    match (matches.next(), matches.next()) {
        (Some(row), None) => row.invoice_sort_group,
        _ => default_group,
    }
}

impl Rule for FormDatastreamSortInvoiceLines {
    fn name(&self) -> &str {
        "FormDatastream_SortInvoiceLines"
    }

    fn description(&self) -> &str {
        "Adds a user defined field to invoice form datastream lines and sorts the lines based on it."
    }

    fn kind(&self) -> RuleKind {
        RuleKind::OnEvent
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let RuleContext { data, session, log, .. } = ctx;
        let ds = data.datastream_mut()?;

        for form in 0..ds.form_count() {
            let header = ds
                .header_of(form)
                .ok_or_else(|| DatastreamError::MissingElement(ds.layout().header_tag.clone()))?;
            let invoice_no = ds.header(header)?.element_value("INVOICE_NUMBER").unwrap_or_default();

            let rows = match self.source.sort_groups(session, &invoice_no) {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(invoice_no = %invoice_no, error = %e, "invoice sort group lookup failed");
                    log.add_and_persist(&format!("Error retrieving invoice sort group info: {}", e));
                    Vec::new()
                }
            };

            for node in ds.lines_of(form) {
                let line = ds.line_mut(node)?;
                let line_no = line.element_value("LINE_NUMBER");
                let group = resolve_sort_group(&rows, &invoice_no, line_no.as_deref(), self.default_group);
                line.push_child(Element::with_text(INVOICE_SORT_GROUP_ELEMENT, Some(&group.to_string())));
            }
        }

        ds.sort_lines(INVOICE_SORT_GROUP_ELEMENT, true, SortOrder::Ascending);
        ds.save()?;

        Ok(RuleResult::success())
    }
}
