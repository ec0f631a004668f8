// 图片存储服务
//
// 上传的图片经过校验和 WebP 转换后，按内容哈希命名保存在存储目录下，
// 并通过 `/storage/...` 对外提供访问。

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};

use super::converter::WebPConverter;
use super::error::StorageError;
use crate::database::vehicle_repository::UploadedImage;
use crate::database::VehicleRepository;

/// 对外访问的路由前缀
pub const STORAGE_ROUTE: &str = "/storage";

/// 图片子目录
const VEHICLES_DIR: &str = "vehicles";

/// 没有可用图片时的占位图
pub const PLACEHOLDER_IMAGE: &str = "/storage/placeholder.webp";

pub struct StorageService {
    root: PathBuf,
    public_base_url: String,
    max_upload_bytes: usize,
    repository: Arc<dyn VehicleRepository>,
}

impl StorageService {
    pub fn new(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
        max_upload_bytes: usize,
        repository: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
            max_upload_bytes,
            repository,
        }
    }

    /// 上传前的快速校验（大小和格式），不做解码
    pub fn precheck(&self, data: &[u8]) -> Result<(), StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        if data.len() > self.max_upload_bytes {
            return Err(StorageError::TooLarge {
                size: data.len(),
                limit: self.max_upload_bytes,
            });
        }
        WebPConverter::detect_format(data)?;
        Ok(())
    }

    /// 保存上传的图片
    ///
    /// 相同内容只保存一次，重复上传直接返回已有记录。
    pub async fn store_image(
        &self,
        data: Vec<u8>,
        original_name: Option<String>,
    ) -> Result<UploadedImage, StorageError> {
        self.precheck(&data)?;

        let content_hash = hex_digest(&data);
        if let Some(existing) = self.repository.find_image_by_hash(&content_hash).await? {
            tracing::debug!("Image {} already stored as {}", content_hash, existing.id);
            return Ok(existing);
        }

        let converted = WebPConverter::convert_async(data).await?;

        let relative_path = format!("{}/{}.webp", VEHICLES_DIR, content_hash);
        let absolute_path = self.root.join(&relative_path);
        if let Some(parent) = absolute_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute_path, &converted.data).await?;

        let image = UploadedImage {
            id: uuid::Uuid::new_v4().to_string(),
            public_url: self.public_url(&relative_path),
            storage_path: relative_path,
            content_hash,
            original_name,
            size_bytes: converted.data.len() as i64,
            created_at: Utc::now(),
        };
        self.repository.insert_image(&image).await?;

        tracing::info!(
            "Stored image {} ({}x{}, {} bytes)",
            image.storage_path,
            converted.width,
            converted.height,
            image.size_bytes
        );
        Ok(image)
    }

    pub async fn get_image(&self, id: &str) -> Result<Option<UploadedImage>, StorageError> {
        Ok(self.repository.get_image(id).await?)
    }

    /// 确保占位图存在（浅灰色 WebP）
    pub async fn ensure_placeholder(&self) -> Result<PathBuf, StorageError> {
        let path = self.root.join(PLACEHOLDER_IMAGE.trim_start_matches(STORAGE_ROUTE).trim_start_matches('/'));
        if tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }

        let pixels = image::RgbaImage::from_pixel(4, 3, image::Rgba([224, 224, 224, 255]));
        let data = webp::Encoder::from_rgba(&pixels, 4, 3).encode_lossless().to_vec();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// 存储路径对应的公开 URL
    pub fn public_url(&self, relative_path: &str) -> String {
        format!(
            "{}{}/{}",
            self.public_base_url,
            STORAGE_ROUTE,
            relative_path.trim_start_matches('/')
        )
    }
}

/// 图片回退：依次取主图和图集中第一个非空地址，都没有时返回占位图
pub fn resolve_image(primary: Option<&str>, gallery: &[String]) -> String {
    primary
        .into_iter()
        .chain(gallery.iter().map(String::as_str))
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string()
}

fn hex_digest(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
