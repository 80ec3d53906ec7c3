//! Deployment state machine
//!
//! Drives one selected unit through
//! Building -> Publishing -> Deploying -> Verifying.
//! Side effects happen only in those four states; every other transition
//! is pure bookkeeping on the unit's own `DeploymentRecord`.

use tokio::time::Instant;

use crate::domain::deploy::{DeploymentRecord, DeploymentState, StageError};
use crate::domain::unit::Unit;

use super::context::PipelineContext;

/// 单个 unit 的状态机实例
///
/// 独占持有自己的 `DeploymentRecord`；一次失败即停在 Failed，
/// 不做自动重试（重跑流水线才是重试机制）
pub struct DeploymentMachine {
    unit: Unit,
    record: DeploymentRecord,
}

impl DeploymentMachine {
    /// 为被选中的 unit 创建状态机（初始 Pending）
    pub fn new(unit: Unit) -> Self {
        let record = DeploymentRecord::new(&unit.name);
        Self { unit, record }
    }

    /// 驱动状态机直到终态，返回部署记录
    pub async fn run(mut self, ctx: &PipelineContext) -> DeploymentRecord {
        self.record.begin();
        tracing::info!(
            unit = %self.unit.name,
            revision = %ctx.revision,
            "Starting deployment"
        );

        // Building
        let image = match ctx.backends.builder.build(&self.unit, &ctx.revision).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(unit = %self.unit.name, error = %e, "Build failed");
                self.record.fail(StageError::Build(e));
                return self.record;
            }
        };
        // imageTag 在 Building -> Publishing 转换时确定，此后不变
        self.record.image = Some(image.clone());
        self.record.advance(DeploymentState::Publishing);

        // Publishing
        if let Err(e) = ctx.backends.registry.push(&image).await {
            tracing::error!(unit = %self.unit.name, error = %e, "Push failed");
            self.record.fail(StageError::Publish(e));
            return self.record;
        }
        self.record.advance(DeploymentState::Deploying);

        // Deploying — force 语义：镜像引用未变也要触发新 rollout
        if let Err(e) = ctx.backends.cluster.force_rollout(&self.unit, &image).await {
            tracing::error!(unit = %self.unit.name, error = %e, "Rollout failed");
            self.record.fail(StageError::Deploy(e));
            return self.record;
        }
        self.record.advance(DeploymentState::Verifying);

        // Verifying — 固定间隔轮询到截止时间，首个成功响应即通过
        self.verify(ctx).await;

        tracing::info!(
            unit = %self.unit.name,
            state = %self.record.state.as_str(),
            duration_ms = ?self.record.duration_ms(),
            "Deployment finished"
        );
        self.record
    }

    async fn verify(&mut self, ctx: &PipelineContext) {
        let deadline = Instant::now() + ctx.health_deadline;

        loop {
            match ctx.backends.health.check(&self.unit).await {
                Ok(true) => {
                    self.record.succeed();
                    return;
                }
                Ok(false) => {
                    tracing::debug!(unit = %self.unit.name, "Health check not yet passing");
                }
                Err(e) => {
                    tracing::debug!(unit = %self.unit.name, error = %e, "Health check unreachable");
                }
            }

            if Instant::now() + ctx.health_poll_interval > deadline {
                self.record.fail(StageError::HealthTimeout {
                    waited_secs: ctx.health_deadline.as_secs(),
                });
                return;
            }
            tokio::time::sleep(ctx.health_poll_interval).await;
        }
    }
}
