// ==========================================
// P21 业务规则 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表读取规则参数覆写，缺省回退默认值
// 存储: config_kv 表 (scope_id + key + value)
// ==========================================

use crate::config::rule_config::RuleConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_table(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_config_table(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取规则参数；未配置的键使用默认值
    pub fn load_rule_config(&self) -> Result<RuleConfig, Box<dyn Error>> {
        let mut config = RuleConfig::default();

        if let Some(v) = self.get_config_value(config_keys::CREDIT_LIMIT)? {
            config.credit_limit = Decimal::from_str(v.trim())
                .map_err(|e| format!("{} = '{}': {}", config_keys::CREDIT_LIMIT, v, e))?;
        }

        if let Some(v) = self.get_config_value(config_keys::DISCOUNT_ITEM_ID)? {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                config.discount_item_id = trimmed.to_string();
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_INVOICE_SORT_GROUP)? {
            config.default_invoice_sort_group = v.trim().parse::<i64>().map_err(|e| {
                format!("{} = '{}': {}", config_keys::DEFAULT_INVOICE_SORT_GROUP, v, e)
            })?;
        }

        if let Some(v) = self.get_config_value(config_keys::ORDER_UPDATED_OUTPUT_PATH)? {
            if !v.trim().is_empty() {
                config.order_updated_output_path = PathBuf::from(v.trim());
            }
        }

        if let Some(v) = self.get_config_value(config_keys::RULE_LOG_PATH)? {
            // 显式配置为空串表示关闭持久化
            config.rule_log_path = match v.trim() {
                "" => None,
                p => Some(PathBuf::from(p)),
            };
        }

        tracing::debug!(?config, "rule config loaded");
        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("lock poisoned: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}

fn ensure_config_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );",
    )
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 信用检查
    pub const CREDIT_LIMIT: &str = "credit_limit";

    // 订单折扣
    pub const DISCOUNT_ITEM_ID: &str = "discount_item_id";

    // 发票行排序
    pub const DEFAULT_INVOICE_SORT_GROUP: &str = "default_invoice_sort_group";

    // 输出文件
    pub const ORDER_UPDATED_OUTPUT_PATH: &str = "order_updated_output_path";
    pub const RULE_LOG_PATH: &str = "rule_log_path";
}
