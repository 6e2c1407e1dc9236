// ==========================================
// P21 业务规则 - 会话与调用状态
// ==========================================
// 职责: 宿主注入的会话元数据（服务器/数据库/用户）与本次调用状态
// ==========================================

use serde::{Deserialize, Serialize};

/// 宿主会话信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub server: String,
    pub database: String,
    pub user_id: String,
    pub version: Option<String>,
    pub language: Option<String>,
}

impl Session {
    pub fn new(server: &str, database: &str, user_id: &str) -> Self {
        Self {
            server: server.to_string(),
            database: database.to_string(),
            user_id: user_id.to_string(),
            version: None,
            language: None,
        }
    }

    /// 日志用的连接描述（不含凭据）
    pub fn connection_label(&self) -> String {
        format!("{}/{} as {}", self.server, self.database, self.user_id)
    }
}

/// 本次规则调用的状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleState {
    /// 多行模式：规则看到整张表；单行模式：只看到触发行的字段
    pub multi_row: bool,
}

impl RuleState {
    pub fn single_row() -> Self {
        Self { multi_row: false }
    }

    pub fn multi_row() -> Self {
        Self { multi_row: true }
    }
}
