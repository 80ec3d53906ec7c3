//! 流水线执行上下文
//!
//! 一次 invocation 内所有状态机共享的只读环境

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::EnvConfig;
use crate::infra::Backends;

/// 执行上下文
///
/// revision、协作方句柄、验证节奏与取消令牌；
/// 各状态机只读共享，互不干扰
#[derive(Clone)]
pub struct PipelineContext {
    /// invocation 标识（日志关联用）
    pub invocation_id: String,
    /// 本次部署的 revision
    pub revision: String,
    /// 外部协作方
    pub backends: Backends,
    /// 健康检查轮询间隔
    pub health_poll_interval: Duration,
    /// 健康检查截止时长
    pub health_deadline: Duration,
    /// invocation 级取消令牌：取消后不再启动新 unit
    pub cancel_token: CancellationToken,
}

impl PipelineContext {
    /// 从环境配置构造
    pub fn new(
        invocation_id: String,
        revision: String,
        backends: Backends,
        config: &EnvConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            invocation_id,
            revision,
            backends,
            health_poll_interval: config.health_poll_interval,
            health_deadline: config.health_deadline,
            cancel_token,
        }
    }

    /// invocation 是否已被取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
