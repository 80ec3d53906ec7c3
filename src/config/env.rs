//! 环境变量配置加载

use std::env;
use std::time::Duration;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 同时处于执行阶段的 unit 数量上限
    pub max_concurrency: usize,
    /// 健康检查轮询间隔
    pub health_poll_interval: Duration,
    /// 健康检查截止时长，超过即判定 HealthTimeout
    pub health_deadline: Duration,
    /// 编排定义文件路径，命中即强制全量部署
    pub workflow_path: String,
    /// 镜像仓库前缀 (e.g., "ghcr.io/xiaojinpro")
    pub image_registry: String,
    /// 浮动便利 tag
    pub floating_tag: String,
    /// git 工作目录（用于 diff / revision 探测）
    pub work_dir: String,
    /// docker compose 文件路径（集群控制器使用）
    pub compose_file: String,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let max_concurrency = env::var("ORCHESTRATOR_MAX_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(constants::DEFAULT_MAX_CONCURRENCY);

        let health_poll_interval = env::var("HEALTH_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(constants::HEALTH_POLL_INTERVAL_SECS));

        let health_deadline = env::var("HEALTH_DEADLINE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(constants::HEALTH_DEADLINE_SECS));

        let workflow_path = env::var("WORKFLOW_DEFINITION_PATH")
            .unwrap_or_else(|_| constants::DEFAULT_WORKFLOW_PATH.to_string());

        let image_registry =
            env::var("IMAGE_REGISTRY").unwrap_or_else(|_| "ghcr.io/xiaojinpro".to_string());

        let floating_tag = env::var("FLOATING_TAG").unwrap_or_else(|_| "latest".to_string());

        let work_dir = env::var("WORK_DIR").unwrap_or_else(|_| ".".to_string());

        let compose_file =
            env::var("COMPOSE_FILE").unwrap_or_else(|_| "docker-compose.yml".to_string());

        Self {
            max_concurrency,
            health_poll_interval,
            health_deadline,
            workflow_path,
            image_registry,
            floating_tag,
            work_dir,
            compose_file,
        }
    }

    /// unit 对应的镜像仓库路径
    pub fn image_repository(&self, unit_name: &str) -> String {
        format!("{}/{}", self.image_registry, unit_name)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_concurrency: constants::DEFAULT_MAX_CONCURRENCY,
            health_poll_interval: Duration::from_secs(constants::HEALTH_POLL_INTERVAL_SECS),
            health_deadline: Duration::from_secs(constants::HEALTH_DEADLINE_SECS),
            workflow_path: constants::DEFAULT_WORKFLOW_PATH.to_string(),
            image_registry: "ghcr.io/xiaojinpro".to_string(),
            floating_tag: "latest".to_string(),
            work_dir: ".".to_string(),
            compose_file: "docker-compose.yml".to_string(),
        }
    }
}

/// 常量
pub mod constants {
    /// 默认并发上限
    pub const DEFAULT_MAX_CONCURRENCY: usize = 3;

    /// 健康检查轮询间隔（秒）
    pub const HEALTH_POLL_INTERVAL_SECS: u64 = 5;

    /// 健康检查截止时长（秒）
    pub const HEALTH_DEADLINE_SECS: u64 = 120;

    /// 默认编排定义路径
    pub const DEFAULT_WORKFLOW_PATH: &str = ".github/workflows/deploy.yml";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
