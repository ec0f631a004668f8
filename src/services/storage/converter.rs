// WebP 转换器
//
// 上传的图片统一转换为无损 WebP：
// - 通过文件头识别格式，只接受 jpeg / png / webp / gif
// - GIF 只保留第一帧
// - CPU 密集的编码放到阻塞线程池执行

use super::error::ConversionError;
use image::{DynamicImage, ImageFormat};
use tokio::task;

/// 允许上传的图片格式
const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// 转换结果
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_format: ImageFormat,
}

pub struct WebPConverter;

impl WebPConverter {
    /// 异步转换，使用 `spawn_blocking` 避免阻塞运行时
    pub async fn convert_async(image_data: Vec<u8>) -> Result<ConvertedImage, ConversionError> {
        task::spawn_blocking(move || Self::convert(&image_data))
            .await
            .map_err(|e| ConversionError::ConversionFailed(format!("任务执行失败: {}", e)))?
    }

    pub fn convert(image_data: &[u8]) -> Result<ConvertedImage, ConversionError> {
        let source_format = Self::detect_format(image_data)?;

        let img = image::load_from_memory_with_format(image_data, source_format)
            .map_err(|e| ConversionError::DecodeFailed(format!("图片解码失败: {}", e)))?;

        Self::encode_webp(img, source_format)
    }

    /// 识别并校验图片格式
    pub fn detect_format(image_data: &[u8]) -> Result<ImageFormat, ConversionError> {
        let format = image::guess_format(image_data)
            .map_err(|e| ConversionError::DecodeFailed(format!("无法识别图片格式: {}", e)))?;

        if !ALLOWED_FORMATS.contains(&format) {
            return Err(ConversionError::UnsupportedFormat(format!("{:?}", format)));
        }

        Ok(format)
    }

    fn encode_webp(img: DynamicImage, source_format: ImageFormat) -> Result<ConvertedImage, ConversionError> {
        let rgba = img.to_rgba8();
        drop(img);
        let (width, height) = rgba.dimensions();

        let encoder = webp::Encoder::from_rgba(&rgba, width, height);
        let webp_data = encoder.encode_lossless();

        Ok(ConvertedImage {
            data: webp_data.to_vec(),
            width,
            height,
            source_format,
        })
    }
}
