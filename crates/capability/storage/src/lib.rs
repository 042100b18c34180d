//! # KIO Storage 模块
//!
//! 对账引擎的持久化抽象层，提供内存与 PostgreSQL 两种实现。
//!
//! ## 模块说明
//!
//! - [`models`]：资产映射键与记录
//! - [`traits`]：MappingStore / FloorHeightStore / ConfigStore
//! - [`error`]：存储错误类型（区分映射冲突）
//! - [`validation`]：映射键与配置校验
//! - [`connection`]：PostgreSQL 连接池管理
//! - [`in_memory`]：内存实现，用于测试与未配置数据库时运行
//! - [`postgres`]：PostgreSQL 实现，表结构见 `migrations/0001_init.sql`
//!
//! ## 约束
//!
//! - 映射一经写入不改写：同一键写入不同资产 ID 返回冲突错误
//! - 映射在资产创建成功后立即持久化，失败重跑不会重复创建

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;
pub mod validation;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

pub use in_memory::{InMemoryConfigStore, InMemoryFloorHeightStore, InMemoryMappingStore};
pub use postgres::{PgConfigStore, PgFloorHeightStore, PgMappingStore};
