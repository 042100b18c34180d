//! Kontakt.io 数据源客户端。
//!
//! - [`wire`]：接口响应结构与到领域模型的转换
//! - [`client`]：基于 reqwest 的 [`kio_reconcile::FeedSource`] 实现

pub mod client;
pub mod wire;

pub use client::{KontaktClient, KontaktEndpoints};
