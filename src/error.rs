//! # 错误类型模块
//!
//! 容器编解码核心使用的错误类型。命令行层在此之上用 `anyhow` 附加上下文。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File size mismatch: header declares {declared} bytes, file has {actual}")]
    SizeMismatch { declared: u32, actual: u64 },

    #[error("File is too short to hold a BMP header ({actual} bytes)")]
    TruncatedHeader { actual: u64 },

    #[error("Image width must be greater than zero")]
    ZeroWidth,

    #[error("Invalid image width '{value}', expected 'auto' or a pixel count")]
    InvalidWidth { value: String },

    #[error("Payload of {payload} bytes does not fit in a 32-bit BMP header")]
    ImageTooLarge { payload: u64 },

    #[error("Header declares {padding} padding bytes but only {image_size} pixel bytes")]
    CorruptPadding { padding: u32, image_size: u32 },

    #[error("Pixel region ended early: expected {expected} bytes, copied {copied}")]
    ShortRead { expected: u64, copied: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
