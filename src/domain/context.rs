// ==========================================
// P21 业务规则 - 规则上下文
// ==========================================
// 职责: 宿主组装的数据（字段/数据集/数据流）+ 会话 + 调用状态 + 日志
// 说明: 规则只在调用期间借用上下文；回写顺序、焦点等提示由宿主读取
// ==========================================

use crate::domain::datastream::XmlDatastream;
use crate::domain::error::{ContextError, ContextResult};
use crate::domain::field::{DataField, FieldSet};
use crate::domain::rule_log::RuleLog;
use crate::domain::session::{RuleState, Session};
use crate::domain::table::{DataSet, DataTable};

/// 执行后请求宿主把焦点放到的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub field: String,
    pub row: Option<usize>,
}

// ==========================================
// RuleData - 规则可读写的数据
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RuleData {
    pub fields: FieldSet,
    pub set: DataSet,
    datastream: Option<XmlDatastream>,
    /// 多行校验器的触发行
    pub trigger_row: Option<usize>,
    focus: Option<FocusRequest>,
    field_update_order: Vec<String>,
    /// 为 true 时宿主按规则代码的修改顺序回写
    pub update_by_order_coded: bool,
}

impl RuleData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: DataField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_table(mut self, table: DataTable) -> ContextResult<Self> {
        self.set.add_table(table)?;
        Ok(self)
    }

    pub fn with_datastream(mut self, datastream: XmlDatastream) -> Self {
        self.datastream = Some(datastream);
        self
    }

    pub fn with_trigger_row(mut self, row: usize) -> Self {
        self.trigger_row = Some(row);
        self
    }

    pub fn table(&self, name: &str) -> ContextResult<&DataTable> {
        self.set.table(name)
    }

    pub fn table_mut(&mut self, name: &str) -> ContextResult<&mut DataTable> {
        self.set.table_mut(name)
    }

    /// 在宿主表中新增一行，返回行号
    pub fn add_new_row(&mut self, table: &str) -> ContextResult<usize> {
        let index = self.set.table_mut(table)?.push_new_row();
        tracing::debug!(table, index, "row added");
        Ok(index)
    }

    pub fn datastream(&self) -> ContextResult<&XmlDatastream> {
        self.datastream.as_ref().ok_or(ContextError::DatastreamMissing)
    }

    pub fn datastream_mut(&mut self) -> ContextResult<&mut XmlDatastream> {
        self.datastream.as_mut().ok_or(ContextError::DatastreamMissing)
    }

    pub fn set_focus(&mut self, field: &str, row: Option<usize>) {
        self.focus = Some(FocusRequest {
            field: field.to_string(),
            row,
        });
    }

    pub fn focus(&self) -> Option<&FocusRequest> {
        self.focus.as_ref()
    }

    /// 单行规则指定字段回写顺序
    pub fn set_field_update_order(&mut self, order: Vec<String>) {
        self.field_update_order = order;
    }

    pub fn field_update_order(&self) -> &[String] {
        &self.field_update_order
    }
}

// ==========================================
// RuleContext - 一次调用的完整上下文
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleContext {
    pub data: RuleData,
    pub session: Session,
    pub rule_state: RuleState,
    pub log: RuleLog,
}

impl RuleContext {
    /// 多行调用默认按代码顺序回写
    pub fn new(mut data: RuleData, session: Session, rule_state: RuleState, log: RuleLog) -> Self {
        if rule_state.multi_row {
            data.update_by_order_coded = true;
        }
        Self {
            data,
            session,
            rule_state,
            log,
        }
    }

    /// 测试/单机场景：默认会话、内存日志
    pub fn local(data: RuleData, rule_state: RuleState) -> Self {
        Self::new(data, Session::default(), rule_state, RuleLog::in_memory())
    }
}
