//! 触发器解释
//!
//! 把三种外部触发形态归一化为一个 `SelectionRequest`。
//! 纯函数，无副作用

use crate::domain::trigger::{SelectionRequest, TriggerEvent};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::state::UnitRegistry;

/// 解释触发事件
///
/// - 改动路径中包含编排定义本身 -> WorkflowChanged（强制全量）
/// - 手动触发 "all"（大小写不敏感）-> AllUnits
/// - 手动触发逗号列表 -> ManualList，任何未注册名称立即失败
/// - 其余 push -> AutoDiff
pub fn interpret(
    event: &TriggerEvent,
    registry: &UnitRegistry,
    workflow_path: &str,
) -> OrchestratorResult<SelectionRequest> {
    match event {
        TriggerEvent::Push { changed_paths } => {
            if changed_paths.iter().any(|p| p == workflow_path) {
                tracing::info!(path = %workflow_path, "Workflow definition changed, forcing all units");
                return Ok(SelectionRequest::workflow_changed());
            }
            Ok(SelectionRequest::auto_diff(changed_paths.iter().cloned()))
        }
        TriggerEvent::Manual { services } => {
            if services.trim().eq_ignore_ascii_case("all") {
                return Ok(SelectionRequest::all_units());
            }

            let names: Vec<String> = services
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if names.is_empty() {
                return Err(OrchestratorError::invalid_trigger(
                    "manual dispatch with an empty services list",
                ));
            }

            // 操作者拼写错误在任何 unit 启动之前就失败
            for name in &names {
                if !registry.contains(name) {
                    return Err(OrchestratorError::unknown_unit(name));
                }
            }

            Ok(SelectionRequest::manual_list(names))
        }
    }
}
