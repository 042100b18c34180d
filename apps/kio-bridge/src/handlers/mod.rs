//! Handlers 模块

pub mod configurations;
pub mod mappings;
pub mod metrics;

pub use configurations::*;
pub use mappings::*;
pub use metrics::*;
