//! 外部协作方实现
//!
//! 镜像构建、镜像仓库、集群控制、健康探测、git 探测

pub mod backends;
pub mod cluster;
pub mod docker;
pub mod git;
pub mod health;

#[cfg(test)]
pub mod testing;

pub use backends::{Backends, ClusterController, HealthProbe, ImageBuilder, RegistryClient};
pub use cluster::ComposeCluster;
pub use docker::DockerCli;
pub use health::HttpHealthProbe;
