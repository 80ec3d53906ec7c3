//! Change Resolver
//!
//! 把 `SelectionRequest` 解析为需要执行的 unit 集合。
//! 注册表不变时同一请求永远得到同一结果（可复现的 CI 运行）

use crate::domain::trigger::{SelectionMode, SelectionReason, SelectionRequest, SelectionResult};
use crate::state::UnitRegistry;

/// 解析选择请求
///
/// AutoDiff 下 unit 被选中当且仅当存在以其 path_prefix 开头的改动路径；
/// 落在所有前缀之外的路径（如文档）不会选中任何 unit。
/// 空改动集合产出空选择，不是错误
pub fn resolve(request: &SelectionRequest, registry: &UnitRegistry) -> SelectionResult {
    let mut result = SelectionResult::empty();

    match request.mode {
        SelectionMode::AllUnits => {
            for unit in registry.list() {
                result.select(&unit.name, SelectionReason::All);
            }
        }
        SelectionMode::WorkflowChanged => {
            for unit in registry.list() {
                result.select(&unit.name, SelectionReason::WorkflowChanged);
            }
        }
        SelectionMode::ManualList => {
            // 触发器解释阶段已验证名称均已注册
            for name in &request.explicit_units {
                result.select(name, SelectionReason::Manual);
            }
        }
        SelectionMode::AutoDiff => {
            for unit in registry.list() {
                if request.changed_paths.iter().any(|p| unit.matches_path(p)) {
                    result.select(&unit.name, SelectionReason::PathChanged);
                }
            }
        }
    }

    tracing::info!(
        mode = ?request.mode,
        selected = result.selected.len(),
        total = registry.len(),
        "Resolved selection"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::Unit;

    fn demo_registry() -> UnitRegistry {
        UnitRegistry::new(vec![
            Unit::new("user-service", "services/user-service/", 3001),
            Unit::new("product-service", "services/product-service/", 3002),
            Unit::new("order-service", "services/order-service/", 3003),
            Unit::new("cart-service", "services/cart-service/", 3004),
            Unit::new("api-gateway", "services/api-gateway/", 3000),
        ])
        .unwrap()
    }

    #[test]
    fn test_auto_diff_selects_exactly_matching_units() {
        let registry = demo_registry();
        let request = SelectionRequest::auto_diff(vec![
            "services/user-service/index.js".to_string(),
        ]);

        let result = resolve(&request, &registry);

        assert_eq!(result.selected.len(), 1);
        assert!(result.contains("user-service"));
        assert_eq!(
            result.reasons.get("user-service"),
            Some(&SelectionReason::PathChanged)
        );
    }

    #[test]
    fn test_paths_outside_all_prefixes_select_nothing() {
        let registry = demo_registry();
        let request = SelectionRequest::auto_diff(vec![
            "README.md".to_string(),
            "docs/architecture.md".to_string(),
        ]);

        let result = resolve(&request, &registry);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_diff_is_empty_selection_not_error() {
        let registry = demo_registry();
        let request = SelectionRequest::auto_diff(Vec::new());

        let result = resolve(&request, &registry);
        assert!(result.is_empty());
    }

    #[test]
    fn test_workflow_changed_selects_every_unit() {
        let registry = demo_registry();
        let result = resolve(&SelectionRequest::workflow_changed(), &registry);

        assert_eq!(result.selected.len(), 5);
        for unit in registry.list() {
            assert_eq!(
                result.reasons.get(&unit.name),
                Some(&SelectionReason::WorkflowChanged)
            );
        }
    }

    #[test]
    fn test_all_units_selects_every_unit_with_all_reason() {
        let registry = demo_registry();
        let result = resolve(&SelectionRequest::all_units(), &registry);

        assert_eq!(result.selected.len(), 5);
        assert_eq!(
            result.reasons.get("api-gateway"),
            Some(&SelectionReason::All)
        );
    }

    #[test]
    fn test_manual_list_selected_verbatim() {
        let registry = demo_registry();
        let request = SelectionRequest::manual_list(vec![
            "user-service".to_string(),
            "order-service".to_string(),
        ]);

        let result = resolve(&request, &registry);
        assert_eq!(result.selected.len(), 2);
        assert!(result.contains("user-service"));
        assert!(result.contains("order-service"));
        assert_eq!(
            result.reasons.get("order-service"),
            Some(&SelectionReason::Manual)
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = demo_registry();
        let request = SelectionRequest::auto_diff(vec![
            "services/order-service/db.js".to_string(),
            "services/cart-service/index.js".to_string(),
        ]);

        let first = resolve(&request, &registry);
        let second = resolve(&request, &registry);

        assert_eq!(first.selected, second.selected);
        assert_eq!(
            format!("{:?}", first.reasons),
            format!("{:?}", second.reasons)
        );
    }
}
