//! 部署相关领域模型
//!
//! 每个被选中的 unit 对应一条 `DeploymentRecord`，
//! 由且仅由它自己的状态机实例持有和变更

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 部署状态机的状态
///
/// ```text
/// Pending -> Building -> Publishing -> Deploying -> Verifying -> Succeeded
///                 \           \             \            \
///                  +-----------+-------------+------------+--> Failed
/// (任意状态) -- 依赖失败/取消 --> Skipped
/// ```
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Pending,
    Building,
    Publishing,
    Deploying,
    Verifying,
    Succeeded,
    Failed,
    Skipped,
}

impl DeploymentState {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Pending => "pending",
            DeploymentState::Building => "building",
            DeploymentState::Publishing => "publishing",
            DeploymentState::Deploying => "deploying",
            DeploymentState::Verifying => "verifying",
            DeploymentState::Succeeded => "succeeded",
            DeploymentState::Failed => "failed",
            DeploymentState::Skipped => "skipped",
        }
    }

    /// 阶段显示名称 (e.g., "Building")
    pub fn display_name(&self) -> &'static str {
        match self {
            DeploymentState::Pending => "Pending",
            DeploymentState::Building => "Building",
            DeploymentState::Publishing => "Publishing",
            DeploymentState::Deploying => "Deploying",
            DeploymentState::Verifying => "Verifying",
            DeploymentState::Succeeded => "Succeeded",
            DeploymentState::Failed => "Failed",
            DeploymentState::Skipped => "Skipped",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Succeeded | DeploymentState::Failed | DeploymentState::Skipped
        )
    }
}

/// 阶段级错误
///
/// 只影响自己所属 unit 的状态机，绝不跨 unit 传播；
/// 对依赖它的 unit 以 Skipped 形式传递
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StageError {
    Build(String),
    Publish(String),
    Deploy(String),
    HealthTimeout { waited_secs: u64 },
    Internal(String),
}

impl StageError {
    /// 错误种类名称，用于汇总展示
    pub fn kind_name(&self) -> &'static str {
        match self {
            StageError::Build(_) => "BuildError",
            StageError::Publish(_) => "PublishError",
            StageError::Deploy(_) => "DeployError",
            StageError::HealthTimeout { .. } => "HealthTimeout",
            StageError::Internal(_) => "InternalError",
        }
    }

    /// 出错时所处的阶段
    pub fn stage(&self) -> DeploymentState {
        match self {
            StageError::Build(_) => DeploymentState::Building,
            StageError::Publish(_) => DeploymentState::Publishing,
            StageError::Deploy(_) => DeploymentState::Deploying,
            StageError::HealthTimeout { .. } => DeploymentState::Verifying,
            StageError::Internal(_) => DeploymentState::Pending,
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageError::Build(m) => write!(f, "build failed: {}", m),
            StageError::Publish(m) => write!(f, "push failed: {}", m),
            StageError::Deploy(m) => write!(f, "rollout failed: {}", m),
            StageError::HealthTimeout { waited_secs } => {
                write!(f, "no healthy response within {}s", waited_secs)
            }
            StageError::Internal(m) => write!(f, "internal: {}", m),
        }
    }
}

/// Skipped 终态的原因
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// 依赖的 unit 失败（或因失败被跳过）
    DependencyFailed { dependency: String },
    /// invocation 被取消，unit 尚未开始
    Cancelled,
}

/// 镜像引用
///
/// Building 成功时确定：revision tag + 浮动便利 tag，两者都会推送
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImageReference {
    /// 镜像仓库路径 (e.g., "ghcr.io/xiaojinpro/user-service")
    pub repository: String,
    /// revision tag (e.g., "a1b2c3d")
    pub tag: String,
    /// 浮动 tag (e.g., "latest")
    pub floating_tag: String,
}

impl ImageReference {
    /// 构造镜像引用
    pub fn new(repository: &str, tag: &str, floating_tag: &str) -> Self {
        Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
            floating_tag: floating_tag.to_string(),
        }
    }

    /// revision 镜像全名
    pub fn primary(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// 浮动 tag 镜像全名
    pub fn floating(&self) -> String {
        format!("{}:{}", self.repository, self.floating_tag)
    }
}

/// 单个 unit 的部署记录
///
/// 由对应状态机实例独占持有；invocation 结束后汇入 summary 即销毁，
/// 不跨 invocation 持久化
#[derive(Clone, Debug, Serialize)]
pub struct DeploymentRecord {
    pub unit: String,
    pub state: DeploymentState,
    /// Building -> Publishing 转换时设置一次，之后不再变化
    pub image: Option<ImageReference>,
    pub attempts: u32,
    pub last_error: Option<StageError>,
    pub skip_reason: Option<SkipReason>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DeploymentRecord {
    /// 创建 Pending 记录
    pub fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            state: DeploymentState::Pending,
            image: None,
            attempts: 0,
            last_error: None,
            skip_reason: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Pending -> Building
    pub fn begin(&mut self) {
        debug_assert_eq!(self.state, DeploymentState::Pending);
        self.state = DeploymentState::Building;
        self.attempts += 1;
        self.started_at = Some(Utc::now());
    }

    /// 推进到下一个执行阶段（纯记账，无副作用）
    pub fn advance(&mut self, next: DeploymentState) {
        debug_assert!(!self.state.is_terminal());
        self.state = next;
    }

    /// 阶段失败，进入 Failed 终态
    ///
    /// 单次 invocation 内没有自动重试：Failed 就停在 Failed，
    /// 重跑流水线才是重试机制
    pub fn fail(&mut self, error: StageError) {
        self.last_error = Some(error);
        self.state = DeploymentState::Failed;
        self.finished_at = Some(Utc::now());
    }

    /// 跳过，进入 Skipped 终态
    pub fn skip(&mut self, reason: SkipReason) {
        self.skip_reason = Some(reason);
        self.state = DeploymentState::Skipped;
        self.finished_at = Some(Utc::now());
    }

    /// 验证通过，进入 Succeeded 终态
    pub fn succeed(&mut self) {
        self.state = DeploymentState::Succeeded;
        self.finished_at = Some(Utc::now());
    }

    /// 持续时间（毫秒）
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}
