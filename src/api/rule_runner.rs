// ==========================================
// P21 业务规则 - 规则调用适配器
// ==========================================
// 职责: 唯一的错误边界；把 RuleError 与 panic 转换为失败的 RuleResult
// 说明: 事件类规则的错误额外写入持久化日志
// ==========================================

use crate::api::error::{RuleError, RuleErrorKind};
use crate::domain::context::RuleContext;
use crate::domain::rule_result::RuleResult;
use crate::engine::rule::Rule;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// 一次调用的完整报告
#[derive(Debug, Clone)]
pub struct RuleReport {
    pub invocation_id: Uuid,
    pub rule_name: String,
    pub result: RuleResult,
    /// 仅在非预期错误时有值
    pub error_kind: Option<RuleErrorKind>,
    pub elapsed: Duration,
}

pub struct RuleRunner;

impl RuleRunner {
    /// 调用规则，只返回结果
    pub fn invoke(rule: &dyn Rule, ctx: &mut RuleContext) -> RuleResult {
        Self::run(rule, ctx).result
    }

    /// 调用规则并返回报告
    pub fn run(rule: &dyn Rule, ctx: &mut RuleContext) -> RuleReport {
        let invocation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "rule",
            rule = rule.name(),
            kind = %rule.kind(),
            %invocation_id,
            multi_row = ctx.rule_state.multi_row
        );
        let _enter = span.enter();
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.execute(ctx)))
            .unwrap_or_else(|payload| Err(RuleError::Panic(panic_message(payload.as_ref()))));

        let (result, error_kind) = match outcome {
            Ok(result) => (result, None),
            Err(err) => {
                let message = err.to_string();
                let kind = err.kind();
                tracing::warn!(error_kind = %kind, error = %message, "rule failed");

                if rule.kind().persists_errors() {
                    ctx.log.add_and_persist(&message);
                }
                (RuleResult::rejected(message), Some(kind))
            }
        };

        let elapsed = started.elapsed();
        tracing::info!(
            success = result.success,
            result_message = %result.message,
            elapsed_ms = elapsed.as_millis() as u64,
            "rule finished"
        );

        RuleReport {
            invocation_id,
            rule_name: rule.name().to_string(),
            result,
            error_kind,
            elapsed,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::RuleData;
    use crate::domain::error::ContextError;
    use crate::domain::rule_log::RuleLog;
    use crate::domain::session::{RuleState, Session};
    use crate::domain::types::RuleKind;
    use crate::engine::rule::RuleOutcome;

    struct Scripted {
        kind: RuleKind,
        behaviour: fn(&mut RuleContext) -> RuleOutcome,
    }

    impl Rule for Scripted {
        fn name(&self) -> &str {
            "Scripted"
        }
        fn description(&self) -> &str {
            "scripted test rule"
        }
        fn kind(&self) -> RuleKind {
            self.kind
        }
        fn execute(&self, ctx: &mut RuleContext) -> RuleOutcome {
            (self.behaviour)(ctx)
        }
    }

    fn ctx() -> RuleContext {
        RuleContext::local(RuleData::new(), RuleState::single_row())
    }

    #[test]
    fn test_success_passes_through() {
        let rule = Scripted {
            kind: RuleKind::General,
            behaviour: |_| Ok(RuleResult::success()),
        };
        let report = RuleRunner::run(&rule, &mut ctx());
        assert!(report.result.success);
        assert!(report.error_kind.is_none());
        assert_eq!(report.rule_name, "Scripted");
    }

    #[test]
    fn test_error_becomes_failed_result() {
        let rule = Scripted {
            kind: RuleKind::Validator,
            behaviour: |ctx| {
                ctx.data.table("d_oe_header")?;
                Ok(RuleResult::success())
            },
        };
        let mut ctx = ctx();
        let report = RuleRunner::run(&rule, &mut ctx);
        assert!(!report.result.success);
        assert_eq!(
            report.result.message,
            ContextError::TableNotFound {
                table: "d_oe_header".to_string()
            }
            .to_string()
        );
        assert_eq!(report.error_kind, Some(RuleErrorKind::NotFound));
        // 非事件类规则不写日志
        assert!(ctx.log.entries().is_empty());
    }

    #[test]
    fn test_event_rule_error_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("rules.log");
        let rule = Scripted {
            kind: RuleKind::OnEvent,
            behaviour: |_| Err(anyhow::anyhow!("datastream locked").into()),
        };
        let mut ctx = RuleContext::new(
            RuleData::new(),
            Session::default(),
            RuleState::single_row(),
            RuleLog::persistent(&log_path),
        );

        let result = RuleRunner::invoke(&rule, &mut ctx);
        assert!(!result.success);
        assert_eq!(result.message, "datastream locked");
        assert_eq!(ctx.log.messages(), vec!["datastream locked"]);
        assert!(std::fs::read_to_string(&log_path).unwrap().contains("datastream locked"));
    }

    #[test]
    fn test_panic_is_contained() {
        let rule = Scripted {
            kind: RuleKind::OnDemand,
            behaviour: |_| panic!("index out of range"),
        };
        let report = RuleRunner::run(&rule, &mut ctx());
        assert!(!report.result.success);
        assert!(report.result.message.contains("index out of range"));
        assert_eq!(report.error_kind, Some(RuleErrorKind::Internal));
    }
}
