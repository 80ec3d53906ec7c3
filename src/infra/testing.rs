//! 测试用协作方替身
//!
//! 以脚本化的内存实现替代 docker/compose/HTTP，
//! 让状态机与调度器的测试确定且不依赖外部进程

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::deploy::ImageReference;
use crate::domain::unit::Unit;

use super::backends::{Backends, ClusterController, HealthProbe, ImageBuilder, RegistryClient};

/// 脚本化替身
///
/// 默认所有阶段成功、健康检查立即通过；
/// 按 unit 名注入指定阶段的失败
pub struct MockBackends {
    fail_build: HashSet<String>,
    fail_push: HashSet<String>,
    fail_rollout: HashSet<String>,
    never_healthy: HashSet<String>,
    /// unit -> 需要轮询多少次才返回健康
    healthy_after_polls: Mutex<HashMap<String, u32>>,
    /// 每个阶段调用的人为延迟，便于观察并发
    stage_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockBackends {
    pub fn new() -> Self {
        Self {
            fail_build: HashSet::new(),
            fail_push: HashSet::new(),
            fail_rollout: HashSet::new(),
            never_healthy: HashSet::new(),
            healthy_after_polls: Mutex::new(HashMap::new()),
            stage_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_build(mut self, unit: &str) -> Self {
        self.fail_build.insert(unit.to_string());
        self
    }

    pub fn fail_push(mut self, unit: &str) -> Self {
        self.fail_push.insert(unit.to_string());
        self
    }

    pub fn fail_rollout(mut self, unit: &str) -> Self {
        self.fail_rollout.insert(unit.to_string());
        self
    }

    pub fn never_healthy(mut self, unit: &str) -> Self {
        self.never_healthy.insert(unit.to_string());
        self
    }

    pub fn healthy_after(self, unit: &str, polls: u32) -> Self {
        self.healthy_after_polls
            .lock()
            .unwrap()
            .insert(unit.to_string(), polls);
        self
    }

    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    /// 四个契约共用同一个替身实例
    pub fn backends(self: &Arc<Self>) -> Backends {
        Backends {
            builder: self.clone(),
            registry: self.clone(),
            cluster: self.clone(),
            health: self.clone(),
        }
    }

    /// 观测到的最大并发阶段调用数
    pub fn max_concurrent_stages(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// 按顺序记录的所有契约调用
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn enter_stage(&self) -> StageGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.stage_delay.is_zero() {
            tokio::time::sleep(self.stage_delay).await;
        }
        StageGuard { owner: self }
    }
}

/// 离开阶段时递减计数
struct StageGuard<'a> {
    owner: &'a MockBackends,
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        self.owner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageBuilder for MockBackends {
    async fn build(&self, unit: &Unit, revision: &str) -> Result<ImageReference, String> {
        let _guard = self.enter_stage().await;
        self.record(format!("build {}", unit.name));

        if self.fail_build.contains(&unit.name) {
            return Err("scripted build failure".to_string());
        }
        Ok(ImageReference::new(
            &format!("registry.test/{}", unit.name),
            revision,
            "latest",
        ))
    }
}

#[async_trait]
impl RegistryClient for MockBackends {
    async fn push(&self, image: &ImageReference) -> Result<(), String> {
        let _guard = self.enter_stage().await;
        self.record(format!("push {}", image.primary()));

        let unit = image
            .repository
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if self.fail_push.contains(&unit) {
            return Err("scripted push failure".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl ClusterController for MockBackends {
    async fn force_rollout(&self, unit: &Unit, image: &ImageReference) -> Result<(), String> {
        let _guard = self.enter_stage().await;
        self.record(format!("rollout {} -> {}", unit.name, image.primary()));

        if self.fail_rollout.contains(&unit.name) {
            return Err("scripted rollout failure".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl HealthProbe for MockBackends {
    async fn check(&self, unit: &Unit) -> Result<bool, String> {
        let _guard = self.enter_stage().await;
        self.record(format!("health {}", unit.name));

        if self.never_healthy.contains(&unit.name) {
            return Ok(false);
        }

        let mut remaining = self.healthy_after_polls.lock().unwrap();
        if let Some(polls) = remaining.get_mut(&unit.name) {
            if *polls > 0 {
                *polls -= 1;
                return Ok(false);
            }
        }
        Ok(true)
    }
}
