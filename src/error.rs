//! 统一错误处理
//!
//! 调度开始前就应失败的错误（操作者/配置错误），区别于
//! 单个 unit 的阶段性失败（见 `domain::deploy::StageError`）

/// 流水线级错误
///
/// 这些错误发生在调度开始之前，直接终止整个 invocation
#[derive(Debug)]
pub enum OrchestratorError {
    /// 手动选择中包含未注册的 unit 名称
    UnknownUnit(String),
    /// 触发器参数无效
    InvalidTrigger(String),
    /// 配置错误
    Config(String),
}

impl OrchestratorError {
    /// 创建未知 unit 错误
    pub fn unknown_unit(name: impl Into<String>) -> Self {
        Self::UnknownUnit(name.into())
    }

    /// 创建触发器无效错误
    pub fn invalid_trigger(message: impl Into<String>) -> Self {
        Self::InvalidTrigger(message.into())
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl std::fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorError::UnknownUnit(name) => write!(f, "Unknown unit: {}", name),
            OrchestratorError::InvalidTrigger(m) => write!(f, "Invalid trigger: {}", m),
            OrchestratorError::Config(m) => write!(f, "Configuration error: {}", m),
        }
    }
}

impl std::error::Error for OrchestratorError {}

/// 便捷类型别名
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
