//! HTTP 健康探针
//!
//! 轮询 unit 的健康端点；只有明确的成功响应算健康

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::unit::Unit;

use super::backends::HealthProbe;

/// HTTP 健康探针
///
/// 复用连接池，每次探测独立短超时
pub struct HttpHealthProbe {
    client: reqwest::Client,
}

impl HttpHealthProbe {
    /// 创建探针
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }

    fn health_url(unit: &Unit) -> String {
        format!("http://127.0.0.1:{}/health", unit.port)
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, unit: &Unit) -> Result<bool, String> {
        let url = Self::health_url(unit);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("health request failed: {}", e))?;

        // "reachable" 不等于 "healthy"：非 2xx 一律视为未通过
        Ok(resp.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url_uses_unit_port() {
        let unit = Unit::new("user-service", "services/user-service/", 3001);
        assert_eq!(
            HttpHealthProbe::health_url(&unit),
            "http://127.0.0.1:3001/health"
        );
    }
}
