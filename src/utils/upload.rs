use crate::{
    config::Config,
    error::{AppError, Result},
};
use axum::extract::Multipart;
use std::path::Path;
use tracing::{debug, error};
use uuid::Uuid;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

const VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-matroska",
    "video/x-msvideo",
    "video/ogg",
];

const AUDIO_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/aac",
    "audio/mp4",
    "audio/x-m4a",
    "audio/flac",
    "audio/webm",
];

/// 上传文件的类别，决定允许的MIME类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Media,
    Audio,
}

impl UploadKind {
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        let content_type = content_type.as_str();
        match self {
            Self::Image => IMAGE_TYPES.contains(&content_type),
            Self::Media => {
                IMAGE_TYPES.contains(&content_type) || VIDEO_TYPES.contains(&content_type)
            }
            Self::Audio => AUDIO_TYPES.contains(&content_type),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Image => "Only image files are allowed",
            Self::Media => "Only image and video files are allowed",
            Self::Audio => "Only audio files are allowed",
        }
    }
}

/// 某个上传端点的限制
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub field: &'static str,
    pub kind: UploadKind,
    pub max_size: usize,
    pub max_files: usize,
}

impl UploadPolicy {
    pub fn thumbnail(config: &Config) -> Self {
        Self {
            field: "thumbnail",
            kind: UploadKind::Image,
            max_size: config.max_image_size,
            max_files: 1,
        }
    }

    pub fn media(config: &Config) -> Self {
        Self {
            field: "media",
            kind: UploadKind::Media,
            max_size: config.max_media_size,
            max_files: config.max_media_files,
        }
    }

    pub fn music(config: &Config) -> Self {
        Self {
            field: "music",
            kind: UploadKind::Audio,
            max_size: config.max_audio_size,
            max_files: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// 读取并校验multipart中指定字段的文件，其他字段被忽略
pub async fn read_files(multipart: &mut Multipart, policy: &UploadPolicy) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to process multipart field: {}", e);
        AppError::FileUpload(format!("Malformed multipart body: {}", e))
    })? {
        if field.name() != Some(policy.field) {
            continue;
        }

        if files.len() >= policy.max_files {
            return Err(AppError::FileUpload(format!(
                "Too many files, at most {} allowed",
                policy.max_files
            )));
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        if !policy.kind.accepts(&content_type) {
            return Err(AppError::FileUpload(format!(
                "{} (got '{}')",
                policy.kind.describe(),
                content_type
            )));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| {
            error!("Failed to read file data: {}", e);
            AppError::FileUpload(format!("Failed to read file data: {}", e))
        })? {
            if data.len() + chunk.len() > policy.max_size {
                return Err(AppError::FileUpload(format!(
                    "File '{}' exceeds the {} byte limit",
                    original_name, policy.max_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        debug!("Received {} ({}), {} bytes", original_name, content_type, data.len());
        files.push(UploadedFile {
            original_name,
            content_type,
            data,
        });
    }

    if files.is_empty() {
        return Err(AppError::FileUpload("No file uploaded".to_string()));
    }

    Ok(files)
}

/// 生成唯一的存储键：`{scope}/{uuid}-{slug}.{ext}`
pub fn storage_key(scope: &str, original_name: &str) -> String {
    let path = Path::new(original_name);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slug::slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "file".to_string());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}/{}-{}{}", scope.trim_end_matches('/'), Uuid::new_v4(), stem, extension)
}
