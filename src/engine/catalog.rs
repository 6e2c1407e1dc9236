// ==========================================
// P21 业务规则 - 规则目录
// ==========================================
// 职责: 按配置构建全部示例规则，供宿主按名称注册
// ==========================================

use crate::config::RuleConfig;
use crate::engine::general::{ValidDatetime, ValidUrl};
use crate::engine::on_demand::AddNewRowForDiscount;
use crate::engine::on_event::{
    FormDatastreamAddGroup, FormDatastreamSortInvoiceLines, OrderUpdatedEvent,
    SuppressExpediteDateMessage,
};
use crate::engine::rule::Rule;
use crate::engine::validator::{OrderCreditCheck, OrderLineCreditCheck};

/// 全部规则（宿主注册顺序）
pub fn default_rules(config: &RuleConfig) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ValidDatetime),
        Box::new(ValidUrl),
        Box::new(AddNewRowForDiscount::new(config)),
        Box::new(OrderCreditCheck::new(config)),
        Box::new(OrderLineCreditCheck::new(config)),
        Box::new(FormDatastreamAddGroup),
        Box::new(FormDatastreamSortInvoiceLines::new(config)),
        Box::new(SuppressExpediteDateMessage),
        Box::new(OrderUpdatedEvent::new(config)),
    ]
}

/// 按名称查找
pub fn find_rule<'a>(rules: &'a [Box<dyn Rule>], name: &str) -> Option<&'a dyn Rule> {
    rules.iter().find(|r| r.name() == name).map(|r| r.as_ref())
}
