//! XJP Deploy Orchestrator - 变更驱动的选择性部署编排器
//!
//! 模块化库入口

pub mod error;
pub mod infra;
pub mod domain;
pub mod config;
pub mod state;
pub mod services;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;
use crate::domain::trigger::TriggerEvent;
use crate::infra::{Backends, ComposeCluster, DockerCli, HttpHealthProbe};
use crate::services::PipelineContext;
use crate::state::UnitRegistry;

/// 命令行覆盖项
///
/// 环境变量提供基础配置，命令行只做单次 invocation 的覆盖
#[derive(Debug, Default)]
pub struct RuntimeConfig {
    /// 触发形态："push"（默认）或 "manual"
    pub event: Option<String>,
    /// revision 覆盖（缺省时取 git HEAD 短 hash）
    pub revision: Option<String>,
    /// 改动路径覆盖（缺省时取 git diff）
    pub changed_paths: Option<Vec<String>>,
    /// manual 触发的服务列表（逗号分隔，或 "all"）
    pub services: Option<String>,
    /// 并发上限覆盖
    pub max_concurrency: Option<usize>,
    /// 以 JSON 输出 summary
    pub json_output: bool,
}

/// 初始化日志
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// 初始化并执行一次部署流水线，返回进程退出码
///
/// 触发器非法、git 探测失败、配置错误都在任何 unit 启动之前
/// 以非零退出码终止
pub async fn init_and_run_pipeline(runtime: RuntimeConfig) -> i32 {
    init_tracing();

    let config = EnvConfig::from_env();
    let max_concurrency = runtime.max_concurrency.unwrap_or(config.max_concurrency);

    let registry = match UnitRegistry::new(config::load_units_from_env()) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "Invalid unit catalogue");
            return 1;
        }
    };
    tracing::info!(units = registry.len(), "Loaded unit catalogue");

    // 组装触发事件；push 缺少显式路径列表时回退到 git diff
    let event = match runtime.event.as_deref().unwrap_or("push") {
        "manual" => {
            let Some(services) = runtime.services else {
                tracing::error!("Manual dispatch requires --services");
                return 1;
            };
            TriggerEvent::Manual { services }
        }
        "push" => {
            let changed_paths = match runtime.changed_paths {
                Some(paths) => paths,
                None => match infra::git::changed_paths(&config.work_dir).await {
                    Ok(paths) => paths,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to detect changed paths");
                        return 1;
                    }
                },
            };
            TriggerEvent::Push { changed_paths }
        }
        other => {
            tracing::error!(event = %other, "Unknown event type, expected push or manual");
            return 1;
        }
    };

    let revision = match runtime.revision {
        Some(revision) => revision,
        None => match infra::git::head_revision(&config.work_dir).await {
            Ok(revision) => revision,
            Err(e) => {
                tracing::error!(error = %e, "Failed to detect revision");
                return 1;
            }
        },
    };

    let health = match HttpHealthProbe::new() {
        Ok(probe) => probe,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build health probe");
            return 1;
        }
    };
    let docker = Arc::new(DockerCli::new(&config));
    let backends = Backends {
        builder: docker.clone(),
        registry: docker,
        cluster: Arc::new(ComposeCluster::new(&config)),
        health: Arc::new(health),
    };

    // Ctrl-C 只取消尚未启动的 unit，进行中的阶段自然收尾
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, no new units will start");
            signal_token.cancel();
        }
    });

    let invocation_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(
        invocation_id = %invocation_id,
        revision = %revision,
        version = %config::env::constants::VERSION,
        "Starting orchestrator"
    );

    let ctx = PipelineContext::new(
        invocation_id,
        revision,
        backends,
        &config,
        cancel_token,
    );

    let summary = match services::run_pipeline(
        &event,
        &registry,
        &config.workflow_path,
        max_concurrency,
        &ctx,
    )
    .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Pipeline rejected before scheduling");
            return 1;
        }
    };

    if runtime.json_output {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize summary");
                return 1;
            }
        }
    } else {
        print!("{}", summary.render());
    }

    summary.overall.exit_code()
}
