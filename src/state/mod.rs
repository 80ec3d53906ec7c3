//! 流水线共享状态

pub mod registry;

pub use registry::UnitRegistry;
