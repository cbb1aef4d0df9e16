//! # 命令行接口模块
//!
//! 使用 `clap` 定义程序的命令行参数。

use crate::header::Width;
use clap::Parser;
use std::path::PathBuf;

/// 将二进制文件转换为 BMP 图像 (或反向还原)，用于观察数据中的模式与对齐。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "将二进制文件转换为 BMP 图像 (或反向还原)，用于观察数据中的模式与对齐。\n\
                  每 4 个字节对齐为 1 个像素，只有前 3 个字节用于 RGB 显示，第 4 个字节被忽略。\n\
                  左下角像素对应第 0 个字节，最上面一行写到第 N 个字节为止，其余以 0 填充。"
)]
pub struct Cli {
    /// 输入文件路径 (编码时为任意二进制文件，解码时为 BMP 图像)。
    pub input: PathBuf,

    /// 输出文件路径。编码时必须是可随机定位的普通文件。
    pub output: PathBuf,

    /// 解码：把 BMP 图像还原为原始二进制文件。
    #[arg(short, long)]
    pub decode: bool,

    /// 启用 bzip2 压缩，编码与解码时必须保持一致。
    #[arg(short, long)]
    pub compress: bool,

    /// 输出图像宽度：`auto` 自动推导，或指定固定的像素数以便统一比较。
    #[arg(short, long, default_value = "auto")]
    pub width: Width,

    /// 打印详细的尺寸与字节统计。
    #[arg(short, long)]
    pub verbose: bool,
}
