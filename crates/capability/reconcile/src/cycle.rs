//! 同步周期：拉取 → 合并过滤 → 坐标换算 → 资产层级 → 属性快照。

use crate::hierarchy::{HierarchyBuilder, LocationTree, ScopeReport};
use crate::identity::IdentityResolver;
use crate::merge::{MergeStats, index_metadata, merge_indexed};
use crate::position::{FloorIndex, attach_world_positions};
use crate::snapshot;
use crate::sources::{AssetSink, AttributeSnapshot, DeadlineSink, FeedError, FeedSource, TimeWindow};
use domain::SourceConfig;
use kio_storage::{FloorHeightStore, MappingStore};
use std::sync::Arc;
use tracing::Instrument;

/// 周期错误。出现时当前周期中止，等待下一次调度。
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
    #[error("storage error: {0}")]
    Storage(String),
}

/// 周期结果。
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub cycle_id: String,
    pub merge: MergeStats,
    pub positioned: u64,
    pub scopes: Vec<ScopeReport>,
    pub snapshots_pushed: u64,
    pub snapshot_failures: u64,
}

impl CycleReport {
    pub fn assets_created(&self) -> u64 {
        self.scopes.iter().map(|scope| scope.created).sum()
    }

    pub fn assets_failed(&self) -> u64 {
        self.scopes.iter().map(|scope| scope.failed).sum()
    }
}

/// 对账引擎入口。
#[derive(Clone)]
pub struct Reconciler {
    sink: Arc<dyn AssetSink>,
    mappings: Arc<dyn MappingStore>,
    floor_heights: Arc<dyn FloorHeightStore>,
}

impl Reconciler {
    pub fn new(
        sink: Arc<dyn AssetSink>,
        mappings: Arc<dyn MappingStore>,
        floor_heights: Arc<dyn FloorHeightStore>,
    ) -> Self {
        Self {
            sink,
            mappings,
            floor_heights,
        }
    }

    /// 执行一次同步周期。
    pub async fn run_cycle(
        &self,
        config: &SourceConfig,
        feed: &dyn FeedSource,
        window: TimeWindow,
    ) -> Result<CycleReport, CycleError> {
        let cycle_id = kio_telemetry::new_cycle_id();
        let span = tracing::info_span!(
            "sync_cycle",
            cycle_id = %cycle_id,
            config_id = config.id
        );
        kio_telemetry::record_cycle_started();
        let result = self
            .run_cycle_inner(cycle_id, config, feed, window)
            .instrument(span)
            .await;
        match &result {
            Ok(_) => kio_telemetry::record_cycle_succeeded(),
            Err(_) => kio_telemetry::record_cycle_failed(),
        }
        result
    }

    async fn run_cycle_inner(
        &self,
        cycle_id: String,
        config: &SourceConfig,
        feed: &dyn FeedSource,
        window: TimeWindow,
    ) -> Result<CycleReport, CycleError> {
        let rooms = feed.list_rooms().await?;
        let metadata = feed.list_devices().await?;
        let index = index_metadata(&config.asset_filter, metadata);
        let telemetry = if index.is_empty() {
            Vec::new()
        } else {
            feed.list_telemetry(&index.tracking_ids(), window).await?
        };
        let positions = feed.list_positions().await?;

        let outcome = merge_indexed(index, telemetry, positions);
        let stats = outcome.stats;
        kio_telemetry::record_merge(
            stats.merged,
            stats.filtered + stats.filter_errors,
            stats.unmatched,
            stats.unsupported,
        );
        tracing::info!(
            target: "kio.merge",
            merged = stats.merged,
            filtered = stats.filtered,
            filter_errors = stats.filter_errors,
            unmatched = stats.unmatched,
            unsupported = stats.unsupported,
            "devices_merged"
        );

        let floors = FloorIndex::load(&rooms, self.floor_heights.as_ref())
            .await
            .map_err(|err| CycleError::Storage(err.to_string()))?;
        let mut devices = outcome.devices;
        let positioned = attach_world_positions(&mut devices, config.origin(), &floors);
        let tree = LocationTree::from_rooms(&rooms);

        // 本周期内所有写入调用都带上数据源配置的请求超时
        let sink: Arc<dyn AssetSink> =
            Arc::new(DeadlineSink::new(self.sink.clone(), config.request_timeout()));
        let resolver = IdentityResolver::new(self.mappings.clone(), sink.clone());

        let mut report = CycleReport {
            cycle_id,
            merge: stats,
            positioned,
            ..CycleReport::default()
        };
        for scope in &config.project_ids {
            let mut scope_report = ScopeReport::new(scope.clone());
            let builder = HierarchyBuilder::new(&resolver, scope);
            let assets = match builder.build_locations(&tree, &mut scope_report).await {
                Ok(assets) => assets,
                Err(err) => {
                    tracing::error!(
                        target: "kio.sync",
                        scope = %scope,
                        error = %err,
                        "scope_root_failed"
                    );
                    report.scopes.push(scope_report);
                    continue;
                }
            };

            let mut snapshots = Vec::new();
            for (id, building) in &tree.buildings {
                if let Some(asset_id) = assets.buildings.get(id) {
                    snapshots.push(snapshot::building_info(*asset_id, building, window.end));
                }
            }
            for (id, floor) in &tree.floors {
                if let Some(asset_id) = assets.floors.get(id) {
                    snapshots.push(snapshot::floor_info(*asset_id, floor, window.end));
                }
            }
            for (id, room) in &tree.rooms {
                if let Some(asset_id) = assets.rooms.get(id) {
                    snapshots.push(snapshot::room_info(*asset_id, room, window.end));
                }
            }

            let resolved = builder
                .build_devices(&assets, &devices, config.unresolved_parent, &mut scope_report)
                .await;
            for (asset_id, device) in resolved {
                snapshots.extend(snapshot::device_snapshots(asset_id, device, window.end));
            }

            for item in &snapshots {
                push_snapshot(sink.as_ref(), item, &mut report).await;
            }
            tracing::info!(
                target: "kio.sync",
                scope = %scope,
                created = scope_report.created,
                reused = scope_report.reused,
                failed = scope_report.failed,
                dropped = scope_report.dropped,
                "scope_reconciled"
            );
            report.scopes.push(scope_report);
        }
        Ok(report)
    }
}

async fn push_snapshot(sink: &dyn AssetSink, item: &AttributeSnapshot, report: &mut CycleReport) {
    match sink.push_attribute_snapshot(item).await {
        Ok(()) => {
            report.snapshots_pushed += 1;
            kio_telemetry::record_snapshot_pushed();
        }
        Err(err) => {
            report.snapshot_failures += 1;
            kio_telemetry::record_snapshot_failure();
            tracing::warn!(
                target: "kio.sync",
                asset_id = item.asset_id,
                subtype = item.subtype.as_str(),
                error = %err,
                "snapshot_push_failed"
            );
        }
    }
}
