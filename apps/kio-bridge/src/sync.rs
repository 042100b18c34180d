//! 周期同步调度
//!
//! 每个调度节拍读取全部数据源配置：
//! - 停用的配置置为未运行；
//! - 启用且当前没有在跑的配置置为运行中，并启动一个同步任务。
//!
//! 同步任务执行一次对账周期后休眠 `refresh_interval`，再从运行集合中移除自己，
//! 因此同一数据源的周期不会重叠。

use chrono::Utc;
use domain::SourceConfig;
use kio_kontakt::{KontaktClient, KontaktEndpoints};
use kio_reconcile::{FeedSource, Reconciler, TimeWindow};
use kio_storage::{ConfigStore, StorageError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// 按数据源配置构造数据源客户端。
pub trait FeedFactory: Send + Sync {
    fn feed_for(&self, config: &SourceConfig) -> Arc<dyn FeedSource>;
}

/// Kontakt.io 客户端工厂（共享同一个 reqwest 连接池）。
pub struct KontaktFeeds {
    http: reqwest::Client,
    endpoints: KontaktEndpoints,
}

impl KontaktFeeds {
    pub fn new(http: reqwest::Client, endpoints: KontaktEndpoints) -> Self {
        Self { http, endpoints }
    }
}

impl FeedFactory for KontaktFeeds {
    fn feed_for(&self, config: &SourceConfig) -> Arc<dyn FeedSource> {
        Arc::new(KontaktClient::for_config(
            self.http.clone(),
            self.endpoints.clone(),
            config,
        ))
    }
}

/// 同步调度服务。
#[derive(Clone)]
pub struct SyncService {
    configs: Arc<dyn ConfigStore>,
    reconciler: Arc<Reconciler>,
    feeds: Arc<dyn FeedFactory>,
    telemetry_window: Duration,
    running: Arc<Mutex<HashSet<i64>>>,
}

impl SyncService {
    pub fn new(
        configs: Arc<dyn ConfigStore>,
        reconciler: Arc<Reconciler>,
        feeds: Arc<dyn FeedFactory>,
        telemetry_window: Duration,
    ) -> Self {
        Self {
            configs,
            reconciler,
            feeds,
            telemetry_window,
            running: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// 启动调度循环。
    pub fn spawn(self, tick: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            // 上次进程退出时残留的运行标记
            match self.configs.set_all_inactive().await {
                Ok(count) => info!(target: "kio.sync", count, "configs_marked_inactive"),
                Err(err) => warn!(target: "kio.sync", error = %err, "mark_inactive_failed"),
            }
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                if let Err(err) = self.tick().await {
                    warn!(target: "kio.sync", error = %err, "scheduler_tick_failed");
                }
            }
        })
    }

    /// 执行一次调度，返回本次新启动的同步任务数。
    pub async fn tick(&self) -> Result<usize, StorageError> {
        let configs = self.configs.list_configs().await?;
        let mut started = 0;
        for config in configs {
            if !config.enable {
                if config.active {
                    self.configs.set_active(config.id, false).await?;
                    info!(target: "kio.sync", config_id = config.id, "source_disabled");
                }
                continue;
            }
            if !self.running.lock().await.insert(config.id) {
                continue;
            }
            if !config.active {
                if let Err(err) = self.configs.set_active(config.id, true).await {
                    warn!(target: "kio.sync", config_id = config.id, error = %err, "set_active_failed");
                }
            }
            let service = self.clone();
            tokio::spawn(async move { service.run_source(config).await });
            started += 1;
        }
        Ok(started)
    }

    /// 跑一个周期，休眠刷新间隔后释放运行标记。
    async fn run_source(self, config: SourceConfig) {
        let feed = self.feeds.feed_for(&config);
        let window = TimeWindow::trailing(Utc::now(), self.telemetry_window);
        match self
            .reconciler
            .run_cycle(&config, feed.as_ref(), window)
            .await
        {
            Ok(report) => info!(
                target: "kio.sync",
                config_id = config.id,
                cycle_id = %report.cycle_id,
                merged = report.merge.merged,
                created = report.assets_created(),
                failed = report.assets_failed(),
                snapshots = report.snapshots_pushed,
                "cycle_finished"
            ),
            Err(err) => error!(
                target: "kio.sync",
                config_id = config.id,
                error = %err,
                "cycle_failed"
            ),
        }
        tokio::time::sleep(config.refresh_interval()).await;
        self.running.lock().await.remove(&config.id);
    }

    #[cfg(test)]
    async fn is_running(&self, id: i64) -> bool {
        self.running.lock().await.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use domain::{AssetId, DeviceMetadata, PositionRecord, Room, TelemetryRecord};
    use kio_reconcile::{AssetDescriptor, AssetSink, AttributeSnapshot, FeedError, SinkError};
    use kio_storage::{
        InMemoryConfigStore, InMemoryFloorHeightStore, InMemoryMappingStore, MappingStore,
    };
    use std::sync::atomic::{AtomicI32, Ordering};

    struct EmptyFeed;

    #[async_trait]
    impl FeedSource for EmptyFeed {
        async fn list_devices(&self) -> Result<Vec<DeviceMetadata>, FeedError> {
            Ok(Vec::new())
        }

        async fn list_telemetry(
            &self,
            _tracking_ids: &[String],
            _window: TimeWindow,
        ) -> Result<Vec<TelemetryRecord>, FeedError> {
            Ok(Vec::new())
        }

        async fn list_positions(&self) -> Result<Vec<PositionRecord>, FeedError> {
            Ok(Vec::new())
        }

        async fn list_rooms(&self) -> Result<Vec<Room>, FeedError> {
            Ok(Vec::new())
        }
    }

    struct EmptyFeeds;

    impl FeedFactory for EmptyFeeds {
        fn feed_for(&self, _config: &SourceConfig) -> Arc<dyn FeedSource> {
            Arc::new(EmptyFeed)
        }
    }

    #[derive(Default)]
    struct SequenceSink {
        next: AtomicI32,
    }

    #[async_trait]
    impl AssetSink for SequenceSink {
        async fn upsert_asset(
            &self,
            _descriptor: &AssetDescriptor,
        ) -> Result<Option<AssetId>, SinkError> {
            Ok(Some(self.next.fetch_add(1, Ordering::SeqCst) + 1))
        }

        async fn push_attribute_snapshot(
            &self,
            _snapshot: &AttributeSnapshot,
        ) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn service(configs: Arc<InMemoryConfigStore>, mappings: Arc<InMemoryMappingStore>) -> SyncService {
        let reconciler = Reconciler::new(
            Arc::new(SequenceSink::default()),
            mappings,
            Arc::new(InMemoryFloorHeightStore::new()),
        );
        SyncService::new(
            configs,
            Arc::new(reconciler),
            Arc::new(EmptyFeeds),
            Duration::from_secs(120),
        )
    }

    fn source(enable: bool) -> SourceConfig {
        let mut config = SourceConfig::new(0, "key");
        config.enable = enable;
        config.refresh_interval_secs = 3600;
        config.project_ids = vec!["p1".to_string()];
        config
    }

    #[tokio::test]
    async fn enabled_source_starts_once() {
        let configs = Arc::new(InMemoryConfigStore::new());
        let mappings = Arc::new(InMemoryMappingStore::new());
        let created = configs.create_config(source(true)).await.expect("create");
        let service = service(configs.clone(), mappings.clone());

        assert_eq!(service.tick().await.expect("tick"), 1);
        assert!(service.is_running(created.id).await);
        assert_eq!(service.tick().await.expect("tick"), 0);

        let stored = configs.find_config(created.id).await.expect("find").expect("exists");
        assert!(stored.active);

        // 根资产在空数据源下也会建立
        let mut root = None;
        for _ in 0..50 {
            root = mappings
                .get(&kio_storage::MappingKey::new("p1", domain::AssetKind::Root, "root"))
                .await
                .expect("get");
            if root.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(root.is_some());
    }

    #[tokio::test]
    async fn disabled_source_is_marked_inactive() {
        let configs = Arc::new(InMemoryConfigStore::new());
        let created = configs.create_config(source(false)).await.expect("create");
        configs.set_active(created.id, true).await.expect("activate");
        let service = service(configs.clone(), Arc::new(InMemoryMappingStore::new()));

        assert_eq!(service.tick().await.expect("tick"), 0);
        assert!(!service.is_running(created.id).await);
        let stored = configs.find_config(created.id).await.expect("find").expect("exists");
        assert!(!stored.active);
    }
}
