use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// 以键寻址的对象存储
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// 写入对象
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// 删除对象
    async fn delete(&self, key: &str) -> Result<()>;

    /// 对象的公共访问URL
    fn public_url(&self, key: &str) -> String;

    /// 从公共URL反推存储键，不属于本存储的URL返回None
    fn key_from_url(&self, url: &str) -> Option<String>;
}

/// 根据配置选择对象存储
pub async fn connect(config: &Config) -> Result<Arc<dyn BlobStore>> {
    match config.storage_type.as_str() {
        "local" => {
            info!("Using local blob storage at {}", config.upload_dir);
            Ok(Arc::new(LocalBlobStore::new(
                &config.upload_dir,
                &config.public_base_url,
            )))
        }
        "memory" => {
            info!("Using in-memory blob storage");
            Ok(Arc::new(MemoryBlobStore::new(&config.public_base_url)))
        }
        #[cfg(feature = "s3-storage")]
        "s3" => {
            info!("Using S3 blob storage, bucket {}", config.s3_bucket);
            Ok(Arc::new(S3BlobStore::new(config).await))
        }
        other => Err(AppError::internal(&format!(
            "Unsupported storage type: {}",
            other
        ))),
    }
}

/// 去掉URL前缀得到存储键
pub fn key_from_prefix(prefix: &str, url: &str) -> Option<String> {
    let prefix = prefix.trim_end_matches('/');
    let rest = url.strip_prefix(prefix)?.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

fn join_url(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), key)
}

/// 本地文件系统存储
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::storage(format!("Invalid storage key: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        debug!("Stored {}", path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await?;
        debug!("Removed {}", path.display());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_prefix(&self.base_url, url)
    }
}

/// 进程内存储，会记录每一次删除调用
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: DashMap<String, (Vec<u8>, String)>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|entry| entry.value().1.clone())
    }

    /// 按调用顺序返回所有被删除的键
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects
            .insert(key.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deleted.lock().push(key.to_string());
        match self.objects.remove(key) {
            Some(_) => Ok(()),
            None => Err(AppError::storage(format!("Object not found: {}", key))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_url(&self.base_url, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        key_from_prefix(&self.base_url, url)
    }
}

#[cfg(feature = "s3-storage")]
pub use s3::S3BlobStore;

#[cfg(feature = "s3-storage")]
mod s3 {
    use super::*;
    use aws_sdk_s3::{types::ByteStream, Client, Region};

    /// S3 兼容对象存储
    #[derive(Clone)]
    pub struct S3BlobStore {
        client: Client,
        bucket: String,
        url_prefix: String,
    }

    impl S3BlobStore {
        pub async fn new(config: &Config) -> Self {
            let shared = aws_config::from_env()
                .region(Region::new(config.s3_region.clone()))
                .load()
                .await;

            let mut builder = aws_sdk_s3::config::Builder::from(&shared);
            if let Some(endpoint) = &config.s3_endpoint {
                builder = builder.endpoint_url(endpoint).force_path_style(true);
            }

            Self {
                client: Client::from_conf(builder.build()),
                bucket: config.s3_bucket.clone(),
                url_prefix: config.s3_url_prefix(),
            }
        }
    }

    #[async_trait]
    impl BlobStore for S3BlobStore {
        async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(data))
                .send()
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| AppError::storage(e.to_string()))?;
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            join_url(&self.url_prefix, key)
        }

        fn key_from_url(&self, url: &str) -> Option<String> {
            key_from_prefix(&self.url_prefix, url)
        }
    }
}
