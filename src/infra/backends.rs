//! 外部协作方契约
//!
//! 核心只依赖这四个窄契约，不直接依赖 docker/compose/HTTP 细节。
//! 契约方法返回裸字符串错误，由状态机包装为对应的 `StageError`

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::deploy::ImageReference;
use crate::domain::unit::Unit;

/// 镜像构建方
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// 为 unit 在指定 revision 构建镜像
    ///
    /// 成功时返回 revision tag + 浮动 tag 的镜像引用
    async fn build(&self, unit: &Unit, revision: &str) -> Result<ImageReference, String>;
}

/// 镜像仓库
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// 推送镜像（revision tag 和浮动 tag 都推）
    async fn push(&self, image: &ImageReference) -> Result<(), String>;
}

/// 集群控制器
#[async_trait]
pub trait ClusterController: Send + Sync {
    /// 强制滚动更新到指定镜像
    ///
    /// 必须具备 force 语义：即使镜像引用未变化也要触发新一轮 rollout
    async fn force_rollout(&self, unit: &Unit, image: &ImageReference) -> Result<(), String>;
}

/// 健康探针
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// 探测一次 unit 的健康端点
    ///
    /// Ok(true) 仅代表收到明确的成功响应；"可达但非成功" 是 Ok(false)
    async fn check(&self, unit: &Unit) -> Result<bool, String>;
}

/// 四个协作方的共享句柄
#[derive(Clone)]
pub struct Backends {
    pub builder: Arc<dyn ImageBuilder>,
    pub registry: Arc<dyn RegistryClient>,
    pub cluster: Arc<dyn ClusterController>,
    pub health: Arc<dyn HealthProbe>,
}
