use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::{debug, error, info};

/// 以ID寻址、整文档读写的文档存储
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 读取表中的全部文档
    async fn list(&self, table: &str) -> Result<Vec<Value>>;

    /// 通过ID获取单个文档
    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>>;

    /// 整文档保存（不存在则创建）
    async fn put(&self, table: &str, id: &str, doc: Value) -> Result<Value>;

    /// 删除文档，返回是否存在
    async fn delete(&self, table: &str, id: &str) -> Result<bool>;
}

/// 根据配置选择文档存储
pub async fn connect(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if config.uses_memory_database() {
        info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db = Database::new(config).await?;
    db.verify_connection().await?;
    Ok(Arc::new(db))
}

/// SurrealDB 数据库服务
#[derive(Clone)]
pub struct Database {
    client: Surreal<Any>,
}

impl Database {
    /// 创建新的数据库实例
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let client = any::connect(config.database_url.as_str()).await?;
        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;
        client
            .use_ns(config.database_namespace.as_str())
            .use_db(config.database_name.as_str())
            .await?;

        Ok(Self { client })
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.health().await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }
}

/// 文档自身不保存 `id` 字段，记录ID即文档ID
fn strip_id(mut doc: Value) -> Value {
    if let Value::Object(map) = &mut doc {
        map.remove("id");
    }
    doc
}

fn with_id(mut doc: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut doc {
        map.insert("id".to_string(), Value::String(id.to_string()));
    }
    doc
}

#[async_trait]
impl DocumentStore for Database {
    async fn list(&self, table: &str) -> Result<Vec<Value>> {
        let mut response = self
            .client
            .query("SELECT *, meta::id(id) AS id FROM type::table($tb)")
            .bind(("tb", table.to_string()))
            .await?;
        let docs: Vec<Value> = response.take(0)?;
        Ok(docs)
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>> {
        debug!("Loading {}:{}", table, id);
        let mut response = self
            .client
            .query("SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let docs: Vec<Value> = response.take(0)?;
        Ok(docs.into_iter().next())
    }

    async fn put(&self, table: &str, id: &str, doc: Value) -> Result<Value> {
        debug!("Saving {}:{}", table, id);
        self.client
            .query("UPDATE type::thing($tb, $id) CONTENT $doc RETURN NONE")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .bind(("doc", strip_id(doc.clone())))
            .await?
            .check()?;
        Ok(with_id(doc, id))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        let mut response = self
            .client
            .query("DELETE type::thing($tb, $id) RETURN BEFORE")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?;
        let removed: Vec<Value> = response.take(0)?;
        Ok(!removed.is_empty())
    }
}

/// 进程内文档存储，用于测试和本地开发
#[derive(Default)]
pub struct MemoryStore {
    docs: DashMap<(String, String), Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self, table: &str) -> Result<Vec<Value>> {
        Ok(self
            .docs
            .iter()
            .filter(|entry| entry.key().0 == table)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get(&self, table: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .docs
            .get(&(table.to_string(), id.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn put(&self, table: &str, id: &str, doc: Value) -> Result<Value> {
        let doc = with_id(doc, id);
        self.docs
            .insert((table.to_string(), id.to_string()), doc.clone());
        Ok(doc)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        Ok(self
            .docs
            .remove(&(table.to_string(), id.to_string()))
            .is_some())
    }
}
