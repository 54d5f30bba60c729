use crate::{
    config::Config,
    services::{
        assets::AssetLifecycle,
        database::DocumentStore,
        profile::ProfileService,
        series::SeriesService,
        storage::BlobStore,
    },
};
use std::sync::Arc;

/// 应用程序的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct AppState {
    /// 应用配置
    pub config: Config,

    /// 用户档案服务
    pub profile_service: ProfileService,

    /// 系列服务
    pub series_service: SeriesService,
}

impl AppState {
    /// 用显式传入的数据库与对象存储句柄组装服务
    pub fn new(config: Config, db: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let assets = AssetLifecycle::new(blobs);
        Self {
            profile_service: ProfileService::new(db.clone()),
            series_service: SeriesService::new(db, assets),
            config,
        }
    }
}
