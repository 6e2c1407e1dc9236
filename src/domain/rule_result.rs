// ==========================================
// P21 业务规则 - 规则结果
// ==========================================

use serde::{Deserialize, Serialize};

/// 规则执行结果，每次调用新建，返回后不再复用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub success: bool,
    pub message: String,
}

impl RuleResult {
    pub fn success() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    /// 数据校验未通过
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// 标记失败并覆盖消息（后出现的问题覆盖先前消息）
    pub fn reject(&mut self, message: impl Into<String>) {
        self.success = false;
        self.message = message.into();
    }
}

impl Default for RuleResult {
    fn default() -> Self {
        Self::success()
    }
}
