//! 可部署单元领域模型

/// 可部署单元
///
/// 注册表加载后不可变，所有组件只读共享
#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    /// 唯一名称 (e.g., "user-service")
    pub name: String,
    /// 源码路径前缀 (e.g., "services/user-service/")
    pub path_prefix: String,
    /// 健康检查端口
    pub port: u16,
    /// 部署依赖（必须先到达终态的 unit 名称，按声明顺序）
    pub depends_on: Vec<String>,
}

impl Unit {
    /// 创建无依赖的 unit
    pub fn new(name: &str, path_prefix: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            path_prefix: path_prefix.to_string(),
            port,
            depends_on: Vec::new(),
        }
    }

    /// 创建带依赖的 unit
    pub fn with_depends_on(name: &str, path_prefix: &str, port: u16, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            path_prefix: path_prefix.to_string(),
            port,
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 判断改动路径是否命中本 unit
    pub fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.path_prefix)
    }
}
