// ==========================================
// P21 业务规则 - 规则参数
// ==========================================
// 职责: 各示例规则使用的可调参数及默认值
// ==========================================

use crate::repository::DEFAULT_INVOICE_SORT_GROUP;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 订单信用检查阈值（美元）
pub const DEFAULT_CREDIT_LIMIT: i64 = 1000;

/// 代表订单折扣的其他费用物料号
pub const DEFAULT_DISCOUNT_ITEM_ID: &str = "ORDER DISCOUNT";

/// 订单更新事件通知文件名
pub const ORDER_UPDATED_FILE_NAME: &str = "OrderUpdatedEventRule.txt";

/// 规则日志文件名
pub const RULE_LOG_FILE_NAME: &str = "p21_rules.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// 订单/订单行金额达到此值即挂起
    pub credit_limit: Decimal,
    pub discount_item_id: String,
    pub default_invoice_sort_group: i64,
    pub order_updated_output_path: PathBuf,
    /// None 时规则日志只保存在内存
    pub rule_log_path: Option<PathBuf>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            credit_limit: Decimal::from(DEFAULT_CREDIT_LIMIT),
            discount_item_id: DEFAULT_DISCOUNT_ITEM_ID.to_string(),
            default_invoice_sort_group: DEFAULT_INVOICE_SORT_GROUP,
            order_updated_output_path: std::env::temp_dir().join(ORDER_UPDATED_FILE_NAME),
            rule_log_path: default_rule_log_path(),
        }
    }
}

/// 默认规则日志路径：用户数据目录下的 p21-business-rules/
pub fn default_rule_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("p21-business-rules").join(RULE_LOG_FILE_NAME))
}
