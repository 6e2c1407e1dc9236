// ==========================================
// P21 业务规则 - 配置层
// ==========================================
// 职责: 规则参数默认值 + config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod rule_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use rule_config::{
    default_rule_log_path, RuleConfig, DEFAULT_CREDIT_LIMIT, DEFAULT_DISCOUNT_ITEM_ID,
    ORDER_UPDATED_FILE_NAME,
};
