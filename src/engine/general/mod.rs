// ==========================================
// 通用字段校验规则
// ==========================================

pub mod valid_datetime;
pub mod valid_url;

pub use valid_datetime::{parse_us_date, supported_date_patterns, ValidDatetime};
pub use valid_url::{check_url, is_alternative_url_valid, UrlCheck, ValidUrl};
