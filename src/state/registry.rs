//! Unit 注册表
//!
//! 构建后只读，可在多个任务间安全共享（Arc）

use std::collections::HashMap;

use crate::domain::unit::Unit;
use crate::error::{OrchestratorError, OrchestratorResult};

/// 可部署单元的静态目录
pub struct UnitRegistry {
    units: Vec<Unit>,
    by_name: HashMap<String, usize>,
}

impl UnitRegistry {
    /// 从 unit 列表构建注册表
    ///
    /// 重名、未注册依赖、依赖环都属于配置错误
    pub fn new(units: Vec<Unit>) -> OrchestratorResult<Self> {
        let mut by_name = HashMap::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            if by_name.insert(unit.name.clone(), i).is_some() {
                return Err(OrchestratorError::config(format!(
                    "duplicate unit name: {}",
                    unit.name
                )));
            }
        }

        // 依赖必须指向已注册的 unit
        for unit in &units {
            for dep in &unit.depends_on {
                if !by_name.contains_key(dep) {
                    return Err(OrchestratorError::config(format!(
                        "unit {} depends on unknown unit {}",
                        unit.name, dep
                    )));
                }
            }
        }

        // 依赖图必须无环：环上的 unit 会相互等待对方的终态，
        // 调度器永远无法收敛
        let mut marks = vec![0u8; units.len()];
        for i in 0..units.len() {
            if let Some(name) = find_cycle(i, &units, &by_name, &mut marks) {
                return Err(OrchestratorError::config(format!(
                    "dependency cycle involving unit {}",
                    name
                )));
            }
        }

        Ok(Self { units, by_name })
    }

    /// 按注册顺序列出全部 unit
    pub fn list(&self) -> &[Unit] {
        &self.units
    }

    /// 按名称解析 unit
    pub fn resolve(&self, name: &str) -> OrchestratorResult<&Unit> {
        self.by_name
            .get(name)
            .map(|&i| &self.units[i])
            .ok_or_else(|| OrchestratorError::unknown_unit(name))
    }

    /// 是否包含指定 unit
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// unit 数量
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// 深度优先找依赖环，返回环上的一个 unit 名
///
/// 标记：0 未访问 / 1 在当前访问栈上 / 2 已完成
fn find_cycle(
    i: usize,
    units: &[Unit],
    by_name: &HashMap<String, usize>,
    marks: &mut [u8],
) -> Option<String> {
    match marks[i] {
        1 => return Some(units[i].name.clone()),
        2 => return None,
        _ => {}
    }

    marks[i] = 1;
    for dep in &units[i].depends_on {
        if let Some(&j) = by_name.get(dep) {
            if let Some(name) = find_cycle(j, units, by_name, marks) {
                return Some(name);
            }
        }
    }
    marks[i] = 2;
    None
}
