// 存储模块 - 车辆图片上传与访问
//
// - 图片格式校验与 WebP 转换
// - 按内容哈希去重保存
// - 公开 URL 生成与图片回退

pub mod converter;
pub mod error;
pub mod service;

pub use converter::{ConvertedImage, WebPConverter};
pub use error::{ConversionError, StorageError};
pub use service::{resolve_image, StorageService, PLACEHOLDER_IMAGE, STORAGE_ROUTE};
