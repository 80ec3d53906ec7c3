//! 配置模块
//!
//! 环境变量解析与 unit 目录管理

pub mod env;
pub mod units;

pub use env::EnvConfig;
pub use units::{default_units, load_units_from_env};
