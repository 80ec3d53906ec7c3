//! Outcome aggregator
//!
//! invocation 结束后把所有部署记录收敛为一份 `DeploymentSummary`。
//! 纯函数：既不重试也不修补，只如实汇报

use std::collections::{BTreeMap, HashMap};

use crate::domain::deploy::{DeploymentRecord, DeploymentState};
use crate::domain::summary::{DeploymentSummary, OverallStatus};
use crate::state::UnitRegistry;

/// 汇总一次 invocation 的全部结果
///
/// outcomes 覆盖注册表中的每一个 unit，包括本轮未被选中的；
/// 整体状态规则：
/// - 任何 Failed（或未到终态的）记录 -> PartialFailure
/// - 没有记录、或全部 Skipped -> AllSkipped
/// - 全部 Succeeded -> AllSucceeded
/// - 成功与跳过混合 -> PartialFailure（本轮没有完整交付）
pub fn summarize(
    records: HashMap<String, DeploymentRecord>,
    registry: &UnitRegistry,
    revision: &str,
) -> DeploymentSummary {
    let mut succeeded = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for record in records.values() {
        match record.state {
            DeploymentState::Succeeded => succeeded += 1,
            DeploymentState::Skipped => skipped += 1,
            // 非终态按失败计
            _ => failed += 1,
        }
    }

    let overall = if failed > 0 {
        OverallStatus::PartialFailure
    } else if succeeded == 0 {
        OverallStatus::AllSkipped
    } else if skipped > 0 {
        OverallStatus::PartialFailure
    } else {
        OverallStatus::AllSucceeded
    };

    let mut outcomes = BTreeMap::new();
    for unit in registry.list() {
        outcomes.insert(
            unit.name.clone(),
            DeploymentSummary::outcome_line(records.get(&unit.name)),
        );
    }

    tracing::info!(
        revision = %revision,
        overall = %overall.as_str(),
        succeeded,
        skipped,
        failed,
        "Aggregated deployment outcomes"
    );

    DeploymentSummary {
        revision: revision.to_string(),
        overall,
        records: records.into_iter().collect(),
        outcomes,
    }
}
