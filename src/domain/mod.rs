//! 领域模型

pub mod deploy;
pub mod summary;
pub mod trigger;
pub mod unit;
