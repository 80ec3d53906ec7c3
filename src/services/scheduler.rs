//! Execution scheduler
//!
//! 每个被选中的 unit 作为独立 tokio 任务运行自己的状态机。
//! 声明的依赖通过 watch 通道等待终态；信号量只作准入闸门，
//! 限制同时处于执行阶段的 unit 数量。
//! 一个 unit 的失败绝不取消或阻塞与它无依赖关系的兄弟 unit —
//! 这是整个系统的核心正确性性质

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};

use crate::domain::deploy::{DeploymentRecord, DeploymentState, SkipReason, StageError};
use crate::domain::trigger::SelectionResult;
use crate::domain::unit::Unit;
use crate::state::UnitRegistry;

use super::context::PipelineContext;
use super::machine::DeploymentMachine;

/// 终态广播通道的载荷：None 表示尚未到达终态
type TerminalTx = watch::Sender<Option<DeploymentState>>;
type TerminalRx = watch::Receiver<Option<DeploymentState>>;

/// 执行调度器
pub struct Scheduler {
    max_concurrency: usize,
}

impl Scheduler {
    /// 创建调度器
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 并发驱动所有被选中 unit 的状态机，返回 unit 名 -> 部署记录
    ///
    /// 不变量：每个被选中的 unit 恰好产生一条到达终态的记录
    pub async fn run(
        &self,
        selection: &SelectionResult,
        registry: &UnitRegistry,
        ctx: &PipelineContext,
    ) -> HashMap<String, DeploymentRecord> {
        if selection.is_empty() {
            return HashMap::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        // 先为每个 unit 建好终态通道，再统一启动任务
        let mut channels: HashMap<String, (TerminalTx, TerminalRx)> = HashMap::new();
        for name in &selection.selected {
            let (tx, rx) = watch::channel(None);
            channels.insert(name.clone(), (tx, rx));
        }

        let mut handles = Vec::with_capacity(selection.selected.len());
        for name in &selection.selected {
            let unit = match registry.resolve(name) {
                Ok(unit) => unit.clone(),
                Err(e) => {
                    // 选择集来自注册表或已验证的手动列表，这里不应该发生
                    tracing::error!(unit = %name, error = %e, "Selected unit missing from registry");
                    let mut record = DeploymentRecord::new(name);
                    record.fail(StageError::Internal(e.to_string()));
                    if let Some((tx, _)) = channels.get(name) {
                        let _ = tx.send(Some(record.state));
                    }
                    handles.push((name.clone(), tokio::spawn(async move { record })));
                    continue;
                }
            };

            // 只等待同样被选中的依赖；未被选中的依赖本轮不动，不构成约束
            let deps: Vec<(String, TerminalRx)> = unit
                .depends_on
                .iter()
                .filter(|d| selection.contains(d))
                .filter_map(|d| channels.get(d).map(|(_, rx)| (d.clone(), rx.clone())))
                .collect();

            let tx = match channels.get(name) {
                Some((tx, _)) => tx.clone(),
                None => continue,
            };
            let semaphore = semaphore.clone();
            let ctx = ctx.clone();

            let handle = tokio::spawn(async move {
                let record = run_unit(unit, deps, semaphore, &ctx).await;
                let _ = tx.send(Some(record.state));
                record
            });
            handles.push((name.clone(), handle));
        }

        let mut records = HashMap::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(record) => {
                    records.insert(name, record);
                }
                Err(e) => {
                    // 未到达终态的 unit 本身就是缺陷，照实上报而不是悄悄丢弃
                    tracing::error!(unit = %name, error = %e, "Unit task aborted");
                    let mut record = DeploymentRecord::new(&name);
                    record.fail(StageError::Internal(format!("task aborted: {}", e)));
                    records.insert(name, record);
                }
            }
        }
        records
    }
}

/// 单个 unit 的任务体：等依赖、过准入闸门、跑状态机
async fn run_unit(
    unit: Unit,
    deps: Vec<(String, TerminalRx)>,
    semaphore: Arc<Semaphore>,
    ctx: &PipelineContext,
) -> DeploymentRecord {
    // 等待所有被选中的依赖到达终态；
    // 依赖 Failed（或因失败被 Skipped）时传递性跳过
    for (dep_name, mut rx) in deps {
        let terminal = rx
            .wait_for(|s| matches!(s, Some(st) if st.is_terminal()))
            .await
            .map(|guard| *guard)
            .unwrap_or(None);

        if terminal != Some(DeploymentState::Succeeded) {
            tracing::warn!(
                unit = %unit.name,
                dependency = %dep_name,
                "Skipping unit because its dependency did not succeed"
            );
            let mut record = DeploymentRecord::new(&unit.name);
            record.skip(SkipReason::DependencyFailed {
                dependency: dep_name,
            });
            return record;
        }
    }

    // 取消后不再启动新 unit（进行中的阶段允许自然结束）
    if ctx.is_cancelled() {
        let mut record = DeploymentRecord::new(&unit.name);
        record.skip(SkipReason::Cancelled);
        return record;
    }

    // 准入闸门：限制同时执行的 unit 数，纯粹用于限流，不存数据
    let permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            let mut record = DeploymentRecord::new(&unit.name);
            record.fail(StageError::Internal(format!("semaphore closed: {}", e)));
            return record;
        }
    };

    // 排队期间可能已被取消
    if ctx.is_cancelled() {
        drop(permit);
        let mut record = DeploymentRecord::new(&unit.name);
        record.skip(SkipReason::Cancelled);
        return record;
    }

    let record = DeploymentMachine::new(unit).run(ctx).await;
    drop(permit);
    record
}
