//! Docker CLI backend
//!
//! Implements image build and registry push by shelling out to `docker`

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::EnvConfig;
use crate::domain::deploy::ImageReference;
use crate::domain::unit::Unit;

use super::backends::{ImageBuilder, RegistryClient};

/// Docker CLI 封装
///
/// build: `docker build -t <repo>:<revision> <prefix>` + 浮动 tag；
/// push: 两个 tag 都推送
pub struct DockerCli {
    config: EnvConfig,
}

impl DockerCli {
    /// 从环境配置创建
    pub fn new(config: &EnvConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// unit 在指定 revision 的镜像引用
    fn image_for(&self, unit: &Unit, revision: &str) -> ImageReference {
        ImageReference::new(
            &self.config.image_repository(&unit.name),
            revision,
            &self.config.floating_tag,
        )
    }

    async fn run_docker(&self, args: &[&str]) -> Result<(), String> {
        let result = Command::new("docker")
            .args(args)
            .current_dir(&self.config.work_dir)
            .output()
            .await;

        match result {
            Ok(output) => {
                if output.status.success() {
                    Ok(())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(format!(
                        "docker {} exited with {}: {}",
                        args.first().unwrap_or(&""),
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    ))
                }
            }
            Err(e) => Err(format!("failed to run docker: {}", e)),
        }
    }
}

#[async_trait]
impl ImageBuilder for DockerCli {
    async fn build(&self, unit: &Unit, revision: &str) -> Result<ImageReference, String> {
        let image = self.image_for(unit, revision);
        let primary = image.primary();

        tracing::info!(unit = %unit.name, image = %primary, "Building image");

        // Build context is the unit's own source subtree
        self.run_docker(&["build", "--progress=plain", "-t", &primary, &unit.path_prefix])
            .await?;

        // Floating convenience tag on the same image
        self.run_docker(&["tag", &primary, &image.floating()]).await?;

        Ok(image)
    }
}

#[async_trait]
impl RegistryClient for DockerCli {
    async fn push(&self, image: &ImageReference) -> Result<(), String> {
        let primary = image.primary();
        let floating = image.floating();

        tracing::info!(image = %primary, "Pushing image");
        self.run_docker(&["push", &primary]).await?;

        tracing::info!(image = %floating, "Pushing floating tag");
        self.run_docker(&["push", &floating]).await?;

        Ok(())
    }
}
