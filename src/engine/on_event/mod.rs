// ==========================================
// 事件规则（宿主事件触发，错误写入持久化日志）
// ==========================================

pub mod form_datastream_add_group;
pub mod form_datastream_sort_invoice_lines;
pub mod order_updated_event;
pub mod suppress_expedite_date_message;

pub use form_datastream_add_group::FormDatastreamAddGroup;
pub use form_datastream_sort_invoice_lines::{resolve_sort_group, FormDatastreamSortInvoiceLines};
pub use order_updated_event::{notification_text, OrderUpdatedEvent};
pub use suppress_expedite_date_message::SuppressExpediteDateMessage;
