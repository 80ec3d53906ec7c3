//! 部署汇总产物
//!
//! Outcome Aggregator 在 invocation 结束时构建一次，只读

use std::collections::BTreeMap;

use serde::Serialize;

use super::deploy::{DeploymentRecord, DeploymentState, SkipReason};

/// 整体状态
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    AllSucceeded,
    PartialFailure,
    AllSkipped,
}

impl OverallStatus {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::AllSucceeded => "all_succeeded",
            OverallStatus::PartialFailure => "partial_failure",
            OverallStatus::AllSkipped => "all_skipped",
        }
    }

    /// 进程退出信号：AllSucceeded / AllSkipped 为成功
    pub fn exit_code(&self) -> i32 {
        match self {
            OverallStatus::AllSucceeded | OverallStatus::AllSkipped => 0,
            OverallStatus::PartialFailure => 1,
        }
    }
}

/// 部署汇总
///
/// `records` 只包含被选中的 unit；`outcomes` 覆盖注册表中的全部 unit，
/// 未被选中的 unit 报告为 "skipped — no change detected"
#[derive(Clone, Debug, Serialize)]
pub struct DeploymentSummary {
    pub revision: String,
    pub overall: OverallStatus,
    pub records: BTreeMap<String, DeploymentRecord>,
    pub outcomes: BTreeMap<String, String>,
}

impl DeploymentSummary {
    /// 单个 unit 的结果描述行
    ///
    /// 失败的 unit 必须点名失败阶段和错误种类，禁止静默失败
    pub fn outcome_line(record: Option<&DeploymentRecord>) -> String {
        let Some(record) = record else {
            return "skipped — no change detected".to_string();
        };

        match record.state {
            DeploymentState::Succeeded => "deployed".to_string(),
            DeploymentState::Skipped => match &record.skip_reason {
                Some(SkipReason::DependencyFailed { dependency }) => {
                    format!("skipped — dependency failed ({})", dependency)
                }
                Some(SkipReason::Cancelled) => "skipped — cancelled".to_string(),
                None => "skipped".to_string(),
            },
            DeploymentState::Failed => match &record.last_error {
                Some(err) => format!(
                    "failed — {}: {}",
                    err.stage().display_name(),
                    err.kind_name()
                ),
                None => "failed".to_string(),
            },
            // 调度器保证每条记录到达终态；非终态记录本身就是缺陷，照实上报
            other => format!("failed — never reached terminal state (stuck in {})", other.as_str()),
        }
    }

    /// 渲染为人类可读的汇总表
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("=== Deployment Summary ({}) ===\n", self.revision));

        for (unit, outcome) in &self.outcomes {
            let icon = match self.records.get(unit).map(|r| r.state) {
                Some(DeploymentState::Succeeded) => "✓",
                Some(DeploymentState::Skipped) | None => "⊘",
                Some(DeploymentState::Failed) => "✗",
                Some(_) => "✗",
            };
            let duration = self
                .records
                .get(unit)
                .and_then(|r| r.duration_ms())
                .map(|d| format!(" ({}ms)", d))
                .unwrap_or_default();
            out.push_str(&format!("{} {}: {}{}\n", icon, unit, outcome, duration));
        }

        out.push_str(&format!("Overall: {}\n", self.overall.as_str()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deploy::StageError;

    #[test]
    fn test_exit_code() {
        assert_eq!(OverallStatus::AllSucceeded.exit_code(), 0);
        assert_eq!(OverallStatus::AllSkipped.exit_code(), 0);
        assert_eq!(OverallStatus::PartialFailure.exit_code(), 1);
    }

    #[test]
    fn test_outcome_line_unselected() {
        assert_eq!(
            DeploymentSummary::outcome_line(None),
            "skipped — no change detected"
        );
    }

    #[test]
    fn test_outcome_line_failed_names_stage_and_kind() {
        let mut record = DeploymentRecord::new("user-service");
        record.begin();
        record.fail(StageError::Build("exit code 1".to_string()));

        assert_eq!(
            DeploymentSummary::outcome_line(Some(&record)),
            "failed — Building: BuildError"
        );
    }

    #[test]
    fn test_outcome_line_dependency_skip() {
        let mut record = DeploymentRecord::new("api-gateway");
        record.skip(SkipReason::DependencyFailed {
            dependency: "user-service".to_string(),
        });

        assert_eq!(
            DeploymentSummary::outcome_line(Some(&record)),
            "skipped — dependency failed (user-service)"
        );
    }

    #[test]
    fn test_outcome_line_surfaces_non_terminal_record() {
        let mut record = DeploymentRecord::new("user-service");
        record.begin();
        record.advance(DeploymentState::Publishing);

        let line = DeploymentSummary::outcome_line(Some(&record));
        assert!(line.contains("never reached terminal state"));
        assert!(line.contains("publishing"));
    }
}
