// ==========================================
// P21 业务规则 - URL 格式校验
// ==========================================
// 类型: 单行通用规则
// 职责: 每个非 global 字段必须是 http/https/file 绝对 URL，
//       Windows 盘符/UNC 路径，或匹配 www. 开头的备用格式
// ==========================================

use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// 允许的绝对 URL scheme
pub const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "file"];

/// 非绝对 URL 的备用格式
const ALTERNATIVE_URL_PATTERN: &str =
    r"^(www.)[0-9a-zA-Z]([-.\w]*[0-9a-zA-Z])*(:(0-9)*)*(/?)([a-zA-Z0-9\-.?,'/\\+&;%$#_]*)?$";

fn alternative_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ALTERNATIVE_URL_PATTERN).expect("alternative URL pattern is valid"))
}

pub fn is_alternative_url_valid(value: &str) -> bool {
    alternative_url_regex().is_match(value)
}

/// 盘符路径 (C:\docs) 与 UNC 路径 (\\server\share) 视为 file URL
const WINDOWS_PATH_PATTERN: &str = r"^(?:[A-Za-z]:[\\/]|\\\\[^\\])";

fn windows_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(WINDOWS_PATH_PATTERN).expect("windows path pattern is valid"))
}

pub fn is_windows_file_path(value: &str) -> bool {
    windows_path_regex().is_match(value)
}

/// 单个值的校验结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlCheck {
    Valid,
    BadScheme(String),
    BadFormat,
}

pub fn check_url(value: &str) -> UrlCheck {
    if is_windows_file_path(value) {
        return UrlCheck::Valid;
    }
    match Url::parse(value) {
        Ok(url) if ALLOWED_SCHEMES.contains(&url.scheme()) => UrlCheck::Valid,
        Ok(url) => UrlCheck::BadScheme(url.scheme().to_string()),
        Err(_) if is_alternative_url_valid(value) => UrlCheck::Valid,
        Err(_) => UrlCheck::BadFormat,
    }
}

// ==========================================
// ValidUrl
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidUrl;

impl Rule for ValidUrl {
    fn name(&self) -> &str {
        "Valid URL"
    }

    fn description(&self) -> &str {
        "Validates URL field has correct format"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::General
    }

    /// 任一字段失败后结果保持失败，后续合法字段（含 www. 备用格式）不会清除；
    /// 消息指向最后一个失败字段
    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let mut result = RuleResult::success();

        for field in ctx.data.fields.iter().filter(|f| !f.is_global()) {
            match check_url(field.value_or_empty()) {
                UrlCheck::Valid => {}
                UrlCheck::BadScheme(scheme) => result.reject(format!(
                    "Incorrect URL scheme ({}) for field {}",
                    scheme,
                    field.qualified_name()
                )),
                UrlCheck::BadFormat => result.reject(format!(
                    "Incorrect URL format for field {}",
                    field.qualified_name()
                )),
            }
        }

        Ok(result)
    }
}
