use serde::{Deserialize, Serialize};
use std::env;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // Database configuration
    pub database_url: String,
    pub database_namespace: String,
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,

    // Storage configuration
    pub storage_type: String,
    pub upload_dir: String,
    pub public_base_url: String,
    pub s3_endpoint: Option<String>,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_public_url: Option<String>,

    // Upload limits
    pub max_image_size: usize,
    pub max_media_size: usize,
    pub max_audio_size: usize,
    pub max_media_files: usize,

    // CORS configuration
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "media_library=debug,tower_http=debug".to_string()),

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            database_namespace: env::var("DATABASE_NAMESPACE")
                .unwrap_or_else(|_| "media".to_string()),
            database_name: env::var("DATABASE_NAME")
                .unwrap_or_else(|_| "library".to_string()),
            database_username: env::var("DATABASE_USERNAME")
                .unwrap_or_else(|_| "root".to_string()),
            database_password: env::var("DATABASE_PASSWORD")
                .unwrap_or_else(|_| "root".to_string()),

            storage_type: env::var("STORAGE_TYPE").unwrap_or_else(|_| "local".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/uploads".to_string()),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "media-library".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            s3_public_url: env::var("S3_PUBLIC_URL").ok(),

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .unwrap_or_else(|_| (50 * MIB).to_string())
                .parse()?,
            max_media_size: env::var("MAX_MEDIA_SIZE")
                .unwrap_or_else(|_| (500 * MIB).to_string())
                .parse()?,
            max_audio_size: env::var("MAX_AUDIO_SIZE")
                .unwrap_or_else(|_| (50 * MIB).to_string())
                .parse()?,
            max_media_files: env::var("MAX_MEDIA_FILES")
                .unwrap_or_else(|_| "50".to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否使用进程内数据库（测试与本地开发）
    pub fn uses_memory_database(&self) -> bool {
        matches!(self.database_url.as_str(), "memory" | "mem://")
    }

    /// S3对象的公共访问前缀
    pub fn s3_url_prefix(&self) -> String {
        match (&self.s3_public_url, &self.s3_endpoint) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(endpoint)) => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.s3_bucket)
            }
            (None, None) => format!(
                "https://{}.s3.{}.amazonaws.com",
                self.s3_bucket, self.s3_region
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            environment: "development".to_string(),
            log_level: "media_library=debug".to_string(),
            database_url: "memory".to_string(),
            database_namespace: "media".to_string(),
            database_name: "library".to_string(),
            database_username: "root".to_string(),
            database_password: "root".to_string(),
            storage_type: "memory".to_string(),
            upload_dir: "./uploads".to_string(),
            public_base_url: "http://localhost:3000/uploads".to_string(),
            s3_endpoint: None,
            s3_bucket: "media-library".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_public_url: None,
            max_image_size: 50 * MIB,
            max_media_size: 500 * MIB,
            max_audio_size: 50 * MIB,
            max_media_files: 50,
            cors_allowed_origins: "*".to_string(),
        }
    }
}
