pub mod assets;
pub mod collection;
pub mod database;
pub mod profile;
pub mod series;
pub mod storage;

// 重新导出常用类型
pub use assets::AssetLifecycle;
pub use collection::CollectionManager;
pub use database::{Database, DocumentStore, MemoryStore};
pub use profile::ProfileService;
pub use series::SeriesService;
pub use storage::{BlobStore, LocalBlobStore, MemoryBlobStore};
