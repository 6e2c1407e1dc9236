// ==========================================
// P21 业务规则 - 日期格式校验
// ==========================================
// 类型: 单行通用规则
// 职责: 每个非 global 字段必须是八种美式日期格式之一
// ==========================================

use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::domain::types::RuleKind;
use crate::engine::rule::{Rule, RuleOutcome};
use chrono::NaiveDate;

/// 数字位宽：Exact2 为两位，OneOrTwo 为一到两位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    OneOrTwo,
    Exact2,
}

#[derive(Debug, Clone, Copy)]
struct DatePattern {
    text: &'static str,
    month: Width,
    day: Width,
    separator: char,
}

/// MM/dd/yyyy, M/d/yyyy, M/dd/yyyy, MM/d/yyyy 及其 '-' 版本
const DATE_PATTERNS: [DatePattern; 8] = [
    DatePattern { text: "MM/dd/yyyy", month: Width::Exact2, day: Width::Exact2, separator: '/' },
    DatePattern { text: "M/d/yyyy", month: Width::OneOrTwo, day: Width::OneOrTwo, separator: '/' },
    DatePattern { text: "M/dd/yyyy", month: Width::OneOrTwo, day: Width::Exact2, separator: '/' },
    DatePattern { text: "MM/d/yyyy", month: Width::Exact2, day: Width::OneOrTwo, separator: '/' },
    DatePattern { text: "MM-dd-yyyy", month: Width::Exact2, day: Width::Exact2, separator: '-' },
    DatePattern { text: "M-d-yyyy", month: Width::OneOrTwo, day: Width::OneOrTwo, separator: '-' },
    DatePattern { text: "M-dd-yyyy", month: Width::OneOrTwo, day: Width::Exact2, separator: '-' },
    DatePattern { text: "MM-d-yyyy", month: Width::Exact2, day: Width::OneOrTwo, separator: '-' },
];

impl DatePattern {
    fn parse(&self, value: &str) -> Option<NaiveDate> {
        let mut parts = value.split(self.separator);
        let month = parts.next()?;
        let day = parts.next()?;
        let year = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        if !digits_fit(month, self.month) || !digits_fit(day, self.day) {
            return None;
        }
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }
}

fn digits_fit(s: &str, width: Width) -> bool {
    let len_ok = match width {
        Width::OneOrTwo => (1..=2).contains(&s.len()),
        Width::Exact2 => s.len() == 2,
    };
    len_ok && s.bytes().all(|b| b.is_ascii_digit())
}

/// 按任一格式解析成功即返回日期
pub fn parse_us_date(value: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|p| p.parse(value))
}

/// 支持的格式文本
pub fn supported_date_patterns() -> Vec<&'static str> {
    DATE_PATTERNS.iter().map(|p| p.text).collect()
}

// ==========================================
// ValidDatetime
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ValidDatetime;

impl Rule for ValidDatetime {
    fn name(&self) -> &str {
        "Valid Datetime"
    }

    fn description(&self) -> &str {
        "Validates the field contains a valid date representation."
    }

    fn kind(&self) -> RuleKind {
        RuleKind::General
    }

    fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
        let mut result = RuleResult::success();

        for field in ctx.data.fields.iter().filter(|f| !f.is_global()) {
            let value = field.value_or_empty();
            if parse_us_date(value).is_some() {
                continue;
            }

            tracing::debug!(field = %field.qualified_name(), value, "invalid date");
            result.reject(format!("Incorrectly formatted date '{}'", value));
        }

        Ok(result)
    }
}
