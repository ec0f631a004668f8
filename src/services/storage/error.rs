// 存储模块错误类型定义

use thiserror::Error;

/// 存储操作的统一错误类型
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    TooLarge { size: usize, limit: usize },

    #[error("空文件")]
    Empty,

    #[error("转换错误: {0}")]
    Conversion(#[from] ConversionError),

    #[error("数据库错误: {0}")]
    Database(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 图片转换相关错误
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("不支持的图片格式: {0}")]
    UnsupportedFormat(String),

    #[error("图片解码失败: {0}")]
    DecodeFailed(String),

    #[error("转换失败: {0}")]
    ConversionFailed(String),
}

impl From<anyhow::Error> for StorageError {
    fn from(err: anyhow::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}
