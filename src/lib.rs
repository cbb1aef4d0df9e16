//! # bmp_bin 库
//!
//! 本库包含二进制文件与 BMP 图像互相转换的核心逻辑。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod header;
pub mod transcoder;
