//! HTTP 辅助函数

pub mod response;
pub mod validation;
