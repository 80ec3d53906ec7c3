//! Unit 目录配置
//!
//! 从 `UNIT_<NAME>_PREFIX` 系列环境变量加载可部署单元目录，
//! 未配置时回退到内置的五个演示服务

use std::collections::BTreeMap;
use std::env;

use crate::domain::unit::Unit;

/// 内置默认目录
///
/// 与演示仓库的五个服务一一对应；api-gateway 位于四个业务服务之后，
/// 声明对它们的部署依赖
pub fn default_units() -> Vec<Unit> {
    vec![
        Unit::new("user-service", "services/user-service/", 3001),
        Unit::new("product-service", "services/product-service/", 3002),
        Unit::new("order-service", "services/order-service/", 3003),
        Unit::new("cart-service", "services/cart-service/", 3004),
        Unit::with_depends_on(
            "api-gateway",
            "services/api-gateway/",
            3000,
            &["user-service", "product-service", "order-service", "cart-service"],
        ),
    ]
}

/// 从环境变量加载 unit 目录
///
/// 识别 `UNIT_<NAME>_PREFIX`（必填）、`UNIT_<NAME>_PORT`（必填）、
/// `UNIT_<NAME>_DEPENDS_ON`（可选，逗号分隔）。
/// 没有任何 `UNIT_*_PREFIX` 时返回内置默认目录
pub fn load_units_from_env() -> Vec<Unit> {
    // BTreeMap 保证加载顺序与环境无关
    let mut discovered: BTreeMap<String, String> = BTreeMap::new();

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix("UNIT_") {
            if let Some(raw_name) = stripped.strip_suffix("_PREFIX") {
                let name = raw_name.to_lowercase().replace('_', "-");
                discovered.insert(name, value);
            }
        }
    }

    if discovered.is_empty() {
        return default_units();
    }

    let mut units = Vec::with_capacity(discovered.len());
    for (name, path_prefix) in discovered {
        let env_name = name.to_uppercase().replace('-', "_");

        let port = match env::var(format!("UNIT_{}_PORT", env_name))
            .ok()
            .and_then(|v| v.parse().ok())
        {
            Some(port) => port,
            None => {
                tracing::warn!(unit = %name, "Skipping unit without a valid UNIT_{}_PORT", env_name);
                continue;
            }
        };

        let depends_on: Vec<String> = env::var(format!("UNIT_{}_DEPENDS_ON", env_name))
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        units.push(Unit {
            name,
            path_prefix,
            port,
            depends_on,
        });
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_units_cover_demo_services() {
        let units = default_units();
        assert_eq!(units.len(), 5);

        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert!(names.contains(&"user-service"));
        assert!(names.contains(&"api-gateway"));

        for unit in &units {
            assert!(unit.path_prefix.starts_with("services/"));
            assert!(unit.path_prefix.ends_with('/'));
        }
    }

    #[test]
    fn test_gateway_depends_on_backend_services() {
        let units = default_units();
        let gateway = units.iter().find(|u| u.name == "api-gateway").unwrap();
        assert_eq!(gateway.depends_on.len(), 4);
        assert!(gateway.depends_on.contains(&"user-service".to_string()));
    }
}
