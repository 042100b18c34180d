//! 内存存储实现模块
//!
//! 用于测试与未配置数据库时的本地运行。
//!
//! 包含以下实现：
//! - MappingStore: InMemoryMappingStore
//! - FloorHeightStore: InMemoryFloorHeightStore
//! - ConfigStore: InMemoryConfigStore

pub mod config;
pub mod floor_height;
pub mod mapping;

pub use config::*;
pub use floor_height::*;
pub use mapping::*;
