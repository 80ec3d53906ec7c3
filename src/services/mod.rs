//! 编排服务层
//!
//! 一次 invocation 的四个阶段：
//! 触发解释 -> 变更解析 -> 并发调度 -> 结果汇总

pub mod aggregator;
pub mod context;
pub mod machine;
pub mod resolver;
pub mod scheduler;
pub mod trigger;

pub use context::PipelineContext;

use crate::domain::summary::DeploymentSummary;
use crate::domain::trigger::TriggerEvent;
use crate::error::OrchestratorResult;
use crate::state::UnitRegistry;

/// 执行一次完整的部署流水线
///
/// 触发器非法（未注册名称、空列表）在任何 unit 启动之前就返回错误；
/// 空选择不是错误，产出 AllSkipped 的 summary
pub async fn run_pipeline(
    event: &TriggerEvent,
    registry: &UnitRegistry,
    workflow_path: &str,
    max_concurrency: usize,
    ctx: &PipelineContext,
) -> OrchestratorResult<DeploymentSummary> {
    let request = trigger::interpret(event, registry, workflow_path)?;
    let selection = resolver::resolve(&request, registry);

    if selection.is_empty() {
        tracing::info!(revision = %ctx.revision, "No units selected, nothing to deploy");
    }

    let records = scheduler::Scheduler::new(max_concurrency)
        .run(&selection, registry, ctx)
        .await;

    Ok(aggregator::summarize(records, registry, &ctx.revision))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::OverallStatus;
    use crate::domain::unit::Unit;
    use crate::error::OrchestratorError;
    use crate::infra::testing::MockBackends;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const WORKFLOW: &str = ".github/workflows/deploy.yml";

    fn registry() -> UnitRegistry {
        UnitRegistry::new(vec![
            Unit::new("user-service", "services/user-service/", 3001),
            Unit::new("product-service", "services/product-service/", 3002),
            Unit::new("order-service", "services/order-service/", 3003),
        ])
        .unwrap()
    }

    fn ctx(mock: &Arc<MockBackends>) -> PipelineContext {
        PipelineContext {
            invocation_id: "test".to_string(),
            revision: "a1b2c3d".to_string(),
            backends: mock.backends(),
            health_poll_interval: Duration::from_millis(5),
            health_deadline: Duration::from_millis(25),
            cancel_token: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn test_push_deploys_only_changed_unit() {
        let mock = Arc::new(MockBackends::new());
        let registry = registry();
        let event = TriggerEvent::Push {
            changed_paths: vec!["services/user-service/index.js".to_string()],
        };

        let summary = run_pipeline(&event, &registry, WORKFLOW, 3, &ctx(&mock))
            .await
            .unwrap();

        assert_eq!(summary.overall, OverallStatus::AllSucceeded);
        assert_eq!(summary.records.len(), 1);
        assert_eq!(summary.outcomes["user-service"], "deployed");
        assert_eq!(
            summary.outcomes["product-service"],
            "skipped — no change detected"
        );
    }

    #[tokio::test]
    async fn test_docs_only_push_deploys_nothing() {
        let mock = Arc::new(MockBackends::new());
        let registry = registry();
        let event = TriggerEvent::Push {
            changed_paths: vec!["README.md".to_string()],
        };

        let summary = run_pipeline(&event, &registry, WORKFLOW, 3, &ctx(&mock))
            .await
            .unwrap();

        assert_eq!(summary.overall, OverallStatus::AllSkipped);
        assert!(summary.records.is_empty());
        assert!(mock.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_manual_typo_fails_before_any_unit_starts() {
        let mock = Arc::new(MockBackends::new());
        let registry = registry();
        let event = TriggerEvent::Manual {
            services: "usr-service".to_string(),
        };

        let err = run_pipeline(&event, &registry, WORKFLOW, 3, &ctx(&mock))
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::UnknownUnit(_)));
        assert!(mock.call_log().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_reported() {
        let mock = Arc::new(MockBackends::new().fail_build("user-service"));
        let registry = registry();
        let event = TriggerEvent::Manual {
            services: "user-service,product-service".to_string(),
        };

        let summary = run_pipeline(&event, &registry, WORKFLOW, 3, &ctx(&mock))
            .await
            .unwrap();

        assert_eq!(summary.overall, OverallStatus::PartialFailure);
        assert_eq!(summary.overall.exit_code(), 1);
        assert_eq!(
            summary.outcomes["user-service"],
            "failed — Building: BuildError"
        );
        assert_eq!(summary.outcomes["product-service"], "deployed");
    }

    #[tokio::test]
    async fn test_workflow_change_redeploys_everything() {
        let mock = Arc::new(MockBackends::new());
        let registry = registry();
        let event = TriggerEvent::Push {
            changed_paths: vec![WORKFLOW.to_string()],
        };

        let summary = run_pipeline(&event, &registry, WORKFLOW, 3, &ctx(&mock))
            .await
            .unwrap();

        assert_eq!(summary.overall, OverallStatus::AllSucceeded);
        assert_eq!(summary.records.len(), 3);
    }
}
