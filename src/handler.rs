//! # 命令处理逻辑模块
//!
//! 包含编码与解码两种模式的高级业务逻辑。
//! 本模块负责打开和创建文件、调用核心转码函数以及向用户报告结果。

use crate::cli::Cli;
use crate::transcoder::{self, DecodeReport, EncodeOptions, EncodeReport};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// 根据 `-d` 标志将执行分派到编码或解码。
pub fn run(args: Cli) -> Result<()> {
    if args.decode {
        handle_decode(args)
    } else {
        handle_encode(args)
    }
}

/// 处理编码模式：把任意二进制文件转换为 BMP 图像。
///
/// # Arguments
///
/// * `args` - 解析后的命令行参数。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出路径指向管道、设备等无法随机定位的目标。
/// * 无法打开输入文件或创建输出文件。
/// * 核心编码函数 (`encode`) 在执行过程中失败。
pub fn handle_encode(args: Cli) -> Result<()> {
    ensure_seekable_target(&args.output)?;

    let input = File::open(&args.input).with_context(|| {
        format!(
            "Unable to open input file: {}",
            args.input.to_string_lossy().red().bold()
        )
    })?;
    let output = File::create(&args.output).with_context(|| {
        format!(
            "Unable to create output image: {}",
            args.output.to_string_lossy().red().bold()
        )
    })?;

    let options = EncodeOptions {
        compress: args.compress,
        width: args.width,
    };
    let report = transcoder::encode(
        &mut BufReader::new(input),
        &mut BufWriter::new(output),
        options,
    )
    .with_context(|| {
        format!(
            "Failed to encode '{}' into an image.",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    if args.verbose {
        print_encode_stats(&report);
    }

    println!(
        "The file has been successfully encoded and saved: {}",
        args.output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理解码模式：从 BMP 图像中还原原始二进制文件。
///
/// 头部校验在创建输出文件之前完成，校验失败时不会留下任何输出。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法打开输入图像或创建输出文件。
/// * 头部声明的文件大小与实际大小不符。
/// * 核心解码函数 (`decode_payload`) 在执行过程中失败，
///   例如压缩标志与编码时不一致。
pub fn handle_decode(args: Cli) -> Result<()> {
    let mut input = File::open(&args.input)
        .map(BufReader::new)
        .with_context(|| {
            format!(
                "Unable to open input image: {}",
                args.input.to_string_lossy().red().bold()
            )
        })?;

    let header = transcoder::read_header(&mut input).with_context(|| {
        format!(
            "'{}' is not a valid image produced by this tool. \nThe file may be truncated or corrupted.",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    let output = File::create(&args.output).with_context(|| {
        format!(
            "Unable to create output file: {}",
            args.output.to_string_lossy().red().bold()
        )
    })?;

    let report = transcoder::decode_payload(
        &mut input,
        &header,
        &mut BufWriter::new(output),
        args.compress,
    )
    .with_context(|| {
        format!(
            "Failed to recover data from '{}'. \nCheck that the compression flag matches the one used to encode it.",
            args.input.to_string_lossy().red().bold()
        )
    })?;

    if args.verbose {
        print_decode_stats(&report);
    }

    println!(
        "The file has been successfully decoded and saved: {}",
        args.output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 编码时头部需要回写，已存在的输出路径必须是普通文件。
fn ensure_seekable_target(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::metadata(path) {
        anyhow::ensure!(
            metadata.is_file(),
            "Output must be a seekable regular file, not a pipe or device: {}",
            path.to_string_lossy().red().bold()
        );
    }
    Ok(())
}

fn print_encode_stats(report: &EncodeReport) {
    let header = &report.header;
    println!("bytes written: {}", report.payload_len.to_string().cyan());
    println!("height: {}", header.height.to_string().cyan());
    println!("width: {}", header.width.to_string().cyan());
    println!("image bytes: {}", header.image_size.to_string().cyan());
    println!("padding: {}", header.padding().to_string().cyan());
    println!("file size: {}", header.file_size.to_string().cyan());
}

fn print_decode_stats(report: &DecodeReport) {
    let header = &report.header;
    println!("height: {}", header.height.to_string().cyan());
    println!("width: {}", header.width.to_string().cyan());
    println!("padding: {}", header.padding().to_string().cyan());
    println!("payload bytes: {}", report.payload_len.to_string().cyan());
    println!("bytes restored: {}", report.restored.to_string().cyan());
}
