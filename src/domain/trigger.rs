//! 触发与选择领域模型
//!
//! 三种外部触发形态统一为一个 `SelectionRequest`，
//! 由 Change Resolver 消费产出 `SelectionResult`

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// 外部触发事件
///
/// 由调用方（CI、操作者）提供的原始触发形态
#[derive(Clone, Debug)]
pub enum TriggerEvent {
    /// 自动触发：一次 revision push 及其改动文件列表
    Push { changed_paths: Vec<String> },
    /// 手动触发：逗号分隔的 unit 列表，或字面量 "all"
    Manual { services: String },
}

/// 选择模式
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// 按改动路径前缀匹配
    AutoDiff,
    /// 手动指定的 unit 列表
    ManualList,
    /// 全部 unit
    AllUnits,
    /// 编排定义自身被改动，强制全部 unit
    WorkflowChanged,
}

/// 选择请求
///
/// 每次 invocation 创建一次，之后不可变
#[derive(Clone, Debug)]
pub struct SelectionRequest {
    pub mode: SelectionMode,
    /// 改动路径集合（仅 mode=AutoDiff 时有内容）
    pub changed_paths: BTreeSet<String>,
    /// 显式 unit 集合（仅 mode=ManualList 时有内容）
    pub explicit_units: BTreeSet<String>,
}

impl SelectionRequest {
    /// 构造 AutoDiff 请求
    pub fn auto_diff(changed_paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            mode: SelectionMode::AutoDiff,
            changed_paths: changed_paths.into_iter().collect(),
            explicit_units: BTreeSet::new(),
        }
    }

    /// 构造手动列表请求
    pub fn manual_list(units: impl IntoIterator<Item = String>) -> Self {
        Self {
            mode: SelectionMode::ManualList,
            changed_paths: BTreeSet::new(),
            explicit_units: units.into_iter().collect(),
        }
    }

    /// 构造全量请求
    pub fn all_units() -> Self {
        Self {
            mode: SelectionMode::AllUnits,
            changed_paths: BTreeSet::new(),
            explicit_units: BTreeSet::new(),
        }
    }

    /// 构造编排定义改动请求
    pub fn workflow_changed() -> Self {
        Self {
            mode: SelectionMode::WorkflowChanged,
            changed_paths: BTreeSet::new(),
            explicit_units: BTreeSet::new(),
        }
    }
}

/// 单个 unit 被选中的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionReason {
    PathChanged,
    Manual,
    WorkflowChanged,
    All,
}

impl SelectionReason {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionReason::PathChanged => "path-changed",
            SelectionReason::Manual => "manual",
            SelectionReason::WorkflowChanged => "workflow-changed",
            SelectionReason::All => "all",
        }
    }
}

/// 选择结果
///
/// Change Resolver 产出一次，之后只读。
/// 使用有序集合保证相同输入得到逐字节相同的结果（可复现性）
#[derive(Clone, Debug, Serialize)]
pub struct SelectionResult {
    /// 被选中的 unit 名称
    pub selected: BTreeSet<String>,
    /// unit 名称 -> 选中原因
    pub reasons: BTreeMap<String, SelectionReason>,
}

impl SelectionResult {
    /// 空选择
    pub fn empty() -> Self {
        Self {
            selected: BTreeSet::new(),
            reasons: BTreeMap::new(),
        }
    }

    /// 记录一个被选中的 unit
    pub fn select(&mut self, name: &str, reason: SelectionReason) {
        self.selected.insert(name.to_string());
        self.reasons.insert(name.to_string(), reason);
    }

    /// 是否为空选择
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// 是否包含指定 unit
    pub fn contains(&self, name: &str) -> bool {
        self.selected.contains(name)
    }
}
