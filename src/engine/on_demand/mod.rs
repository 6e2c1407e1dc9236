// ==========================================
// 按需规则（宿主按钮触发）
// ==========================================

pub mod add_new_row_for_discount;

pub use add_new_row_for_discount::{discount_amount, AddNewRowForDiscount};
