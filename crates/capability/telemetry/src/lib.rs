//! 追踪、请求/周期 ID 生成与同步指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 同步指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles_started: u64,
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub devices_merged: u64,
    pub devices_filtered: u64,
    pub devices_unmatched: u64,
    pub devices_unsupported: u64,
    pub assets_created: u64,
    pub asset_failures: u64,
    pub snapshots_pushed: u64,
    pub snapshot_failures: u64,
    pub floor_heights_updated: u64,
}

/// 同步指标（进程内累计）。
pub struct SyncMetrics {
    cycles_started: AtomicU64,
    cycles_succeeded: AtomicU64,
    cycles_failed: AtomicU64,
    devices_merged: AtomicU64,
    devices_filtered: AtomicU64,
    devices_unmatched: AtomicU64,
    devices_unsupported: AtomicU64,
    assets_created: AtomicU64,
    asset_failures: AtomicU64,
    snapshots_pushed: AtomicU64,
    snapshot_failures: AtomicU64,
    floor_heights_updated: AtomicU64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            cycles_started: AtomicU64::new(0),
            cycles_succeeded: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
            devices_merged: AtomicU64::new(0),
            devices_filtered: AtomicU64::new(0),
            devices_unmatched: AtomicU64::new(0),
            devices_unsupported: AtomicU64::new(0),
            assets_created: AtomicU64::new(0),
            asset_failures: AtomicU64::new(0),
            snapshots_pushed: AtomicU64::new(0),
            snapshot_failures: AtomicU64::new(0),
            floor_heights_updated: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_started: self.cycles_started.load(Ordering::Relaxed),
            cycles_succeeded: self.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            devices_merged: self.devices_merged.load(Ordering::Relaxed),
            devices_filtered: self.devices_filtered.load(Ordering::Relaxed),
            devices_unmatched: self.devices_unmatched.load(Ordering::Relaxed),
            devices_unsupported: self.devices_unsupported.load(Ordering::Relaxed),
            assets_created: self.assets_created.load(Ordering::Relaxed),
            asset_failures: self.asset_failures.load(Ordering::Relaxed),
            snapshots_pushed: self.snapshots_pushed.load(Ordering::Relaxed),
            snapshot_failures: self.snapshot_failures.load(Ordering::Relaxed),
            floor_heights_updated: self.floor_heights_updated.load(Ordering::Relaxed),
        }
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<SyncMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static SyncMetrics {
    METRICS.get_or_init(SyncMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 生成同步周期 ID（写入周期 span）。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn record_cycle_started() {
    metrics().cycles_started.fetch_add(1, Ordering::Relaxed);
}

pub fn record_cycle_succeeded() {
    metrics().cycles_succeeded.fetch_add(1, Ordering::Relaxed);
}

pub fn record_cycle_failed() {
    metrics().cycles_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次合并的结果计数。
pub fn record_merge(merged: u64, filtered: u64, unmatched: u64, unsupported: u64) {
    let metrics = metrics();
    metrics.devices_merged.fetch_add(merged, Ordering::Relaxed);
    metrics.devices_filtered.fetch_add(filtered, Ordering::Relaxed);
    metrics
        .devices_unmatched
        .fetch_add(unmatched, Ordering::Relaxed);
    metrics
        .devices_unsupported
        .fetch_add(unsupported, Ordering::Relaxed);
}

pub fn record_asset_created() {
    metrics().assets_created.fetch_add(1, Ordering::Relaxed);
}

pub fn record_asset_failure() {
    metrics().asset_failures.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_pushed() {
    metrics().snapshots_pushed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_failure() {
    metrics().snapshot_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录楼层高度回写次数。
pub fn record_floor_height_updated() {
    metrics()
        .floor_heights_updated
        .fetch_add(1, Ordering::Relaxed);
}
