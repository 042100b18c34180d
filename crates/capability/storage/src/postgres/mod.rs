//! # PostgreSQL 存储实现模块
//!
//! 依赖以下数据库表：
//! - `configuration`：数据源配置（过滤规则以 JSON 文本保存）
//! - `asset_mapping`：资产映射，主键 `(scope, kind, logical_key)`
//! - `floor_height`：楼层高度，主键 `floor_key`
//!
//! 所有查询使用参数绑定；连接池由 [`crate::connection::connect_pool`] 建立。

pub mod config;
pub mod floor_height;
pub mod mapping;

pub use config::*;
pub use floor_height::*;
pub use mapping::*;
