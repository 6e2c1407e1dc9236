// ==========================================
// P21 业务规则 - 领域模型层
// ==========================================
// 职责: 宿主数据上下文的类型化模型（字段/表/数据流/会话/日志/结果）
// 红线: 不含规则逻辑
// ==========================================

pub mod context;
pub mod datastream;
pub mod error;
pub mod field;
pub mod rule_log;
pub mod rule_result;
pub mod session;
pub mod table;
pub mod types;

// 重导出核心类型
pub use context::{FocusRequest, RuleContext, RuleData};
pub use datastream::{DatastreamLayout, Element, Node, NodeRef, XmlDatastream};
pub use error::{ContextError, ContextResult, DatastreamError};
pub use field::{DataField, FieldSet, GLOBAL_CLASS_NAME};
pub use rule_log::{LogEntry, RuleLog};
pub use rule_result::RuleResult;
pub use session::{RuleState, Session};
pub use table::{Column, DataRow, DataSet, DataTable, RowAccess, RowMut, RowPredicate, RowRef};
pub use types::{ColumnType, Disposition, RuleKind, SortOrder, Value};
