//! Docker Compose cluster controller
//!
//! Rolls a named service to a new image via `docker compose`

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::EnvConfig;
use crate::domain::deploy::ImageReference;
use crate::domain::unit::Unit;

use super::backends::ClusterController;

/// Compose 集群控制器
///
/// force 语义是刻意保留的策略：`--force-recreate` 让镜像引用未变化时
/// 也会重建容器，绝不优化为 no-op
pub struct ComposeCluster {
    compose_file: String,
    work_dir: String,
}

impl ComposeCluster {
    /// 从环境配置创建
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            compose_file: config.compose_file.clone(),
            work_dir: config.work_dir.clone(),
        }
    }
}

#[async_trait]
impl ClusterController for ComposeCluster {
    async fn force_rollout(&self, unit: &Unit, image: &ImageReference) -> Result<(), String> {
        tracing::info!(
            unit = %unit.name,
            image = %image.primary(),
            "Forcing rollout"
        );

        // Pull the freshly pushed revision tag first so compose picks it up
        let pull = Command::new("docker")
            .args(["pull", &image.primary()])
            .current_dir(&self.work_dir)
            .output()
            .await;
        if let Err(e) = pull {
            return Err(format!("failed to run docker pull: {}", e));
        }

        let result = Command::new("docker")
            .args([
                "compose",
                "-f",
                &self.compose_file,
                "up",
                "-d",
                "--force-recreate",
                "--no-deps",
                &unit.name,
            ])
            .current_dir(&self.work_dir)
            .output()
            .await;

        match result {
            Ok(output) => {
                if output.status.success() {
                    Ok(())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(format!(
                        "docker compose up exited with {}: {}",
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    ))
                }
            }
            Err(e) => Err(format!("failed to run docker compose: {}", e)),
        }
    }
}
