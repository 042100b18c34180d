//! Eliona 资产写入客户端。
//!
//! - [`body`]：资产与属性数据的请求体
//! - [`client`]：基于 reqwest 的 [`kio_reconcile::AssetSink`] 实现

pub mod body;
pub mod client;

pub use client::ElionaClient;
