use bmp_bin::{
    cli::Cli,
    header::Width,
    handler::{handle_decode, handle_encode, run},
};
use clap::{Parser, error::ErrorKind};
use rand::RngCore;
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个填满随机字节的测试文件
fn create_random_file(path: &Path, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rand::rng().fill_bytes(&mut data);
    fs::write(path, &data).expect("Failed to create test file.");
    data
}

fn cli(input: &Path, output: &Path, decode: bool, compress: bool, width: Width) -> Cli {
    Cli {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        decode,
        compress,
        width,
        verbose: true,
    }
}

fn u32_at(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

/// 编码后再解码，返回生成的图像与还原文件的路径
fn round_trip(
    dir: &Path,
    source: &Path,
    compress: bool,
    width: Width,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let image_path = dir.join("encoded.bmp");
    let restored_path = dir.join("restored.bin");
    handle_encode(cli(source, &image_path, false, compress, width))?;
    handle_decode(cli(&image_path, &restored_path, true, compress, Width::Auto))?;
    Ok((image_path, restored_path))
}

/// 验证原始模式下从编码到解码的完整流程
#[test]
fn test_encode_and_decode_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let original = create_random_file(&source_path, 5000);

    // 2. 编码并解码
    let (image_path, restored_path) = round_trip(dir.path(), &source_path, false, Width::Auto)?;

    // 3. 验证头部与实际文件大小一致
    let image = fs::read(&image_path)?;
    assert_eq!(u32_at(&image, 2) as usize, image.len());
    let width = u32_at(&image, 18);
    let height = u32_at(&image, 22);
    assert_eq!(u32_at(&image, 34), 4 * width * height);
    assert_eq!(u32_at(&image, 34) - u32_at(&image, 42), 5000);

    // 4. 验证结果
    let restored = fs::read(&restored_path)?;
    assert_eq!(original, restored, "Restored bytes must match the original.");

    Ok(())
}

/// 验证压缩模式下的往返
#[test]
fn test_compressed_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let mut original = b"repeating structure ".repeat(500);
    original.extend(create_random_file(&source_path, 777));
    fs::write(&source_path, &original)?;

    let (image_path, restored_path) = round_trip(dir.path(), &source_path, true, Width::Auto)?;

    let image = fs::read(&image_path)?;
    assert_eq!(u32_at(&image, 2) as usize, image.len());
    assert_eq!(fs::read(&restored_path)?, original);

    Ok(())
}

/// 指定宽度时头部宽度与之一致，且不影响还原结果
#[test]
fn test_explicit_width_is_honoured() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let original = create_random_file(&source_path, 1234);

    for width in [1u32, 3, 16, 500] {
        let width_arg = Width::Fixed(NonZeroU32::new(width).unwrap());
        let (image_path, restored_path) = round_trip(dir.path(), &source_path, false, width_arg)?;

        let image = fs::read(&image_path)?;
        assert_eq!(u32_at(&image, 18), width);
        assert_eq!(fs::read(&restored_path)?, original);
    }

    Ok(())
}

/// 生成的图像可以被常规 BMP 解码器打开
#[test]
fn test_output_opens_as_bmp() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    create_random_file(&source_path, 3000);

    let (image_path, _) = round_trip(dir.path(), &source_path, false, Width::Auto)?;

    let bytes = fs::read(&image_path)?;
    let decoded = image::open(&image_path)?;
    assert_eq!(decoded.width(), u32_at(&bytes, 18));
    assert_eq!(decoded.height(), u32_at(&bytes, 22));

    Ok(())
}

/// 头部文件大小被篡改时解码失败，且不创建输出文件
#[test]
fn test_size_mismatch_writes_no_output() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let image_path = dir.path().join("encoded.bmp");
    let restored_path = dir.path().join("restored.bin");
    create_random_file(&source_path, 100);

    handle_encode(cli(&source_path, &image_path, false, false, Width::Auto))?;

    let mut image = fs::read(&image_path)?;
    let declared = u32_at(&image, 2) + 1;
    image[2..6].copy_from_slice(&declared.to_le_bytes());
    fs::write(&image_path, &image)?;

    let result = handle_decode(cli(&image_path, &restored_path, true, false, Width::Auto));

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.root_cause().to_string().contains("File size mismatch"));
    }
    assert!(
        !restored_path.exists(),
        "No output should be created for a corrupted image."
    );

    Ok(())
}

/// 改动填充字节不影响还原出的载荷
#[test]
fn test_padding_bytes_are_ignored() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let image_path = dir.path().join("encoded.bmp");
    let restored_path = dir.path().join("restored.bin");
    let original: Vec<u8> = (0u8..10).collect();
    fs::write(&source_path, &original)?;

    handle_encode(cli(&source_path, &image_path, false, false, Width::Auto))?;

    let mut image = fs::read(&image_path)?;
    let padding = u32_at(&image, 42) as usize;
    assert_eq!(padding, 6);
    let len = image.len();
    image[len - padding..].fill(0xAB);
    fs::write(&image_path, &image)?;

    run(cli(&image_path, &restored_path, true, false, Width::Auto))?;
    assert_eq!(fs::read(&restored_path)?, original);

    Ok(())
}

/// 空文件在两种模式下都能往返
#[test]
fn test_empty_file_round_trip() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("empty.bin");
    fs::write(&source_path, b"")?;

    for compress in [false, true] {
        let (_, restored_path) = round_trip(dir.path(), &source_path, compress, Width::Auto)?;
        assert!(fs::read(&restored_path)?.is_empty());
    }

    Ok(())
}

/// 输出路径不是普通文件时拒绝编码
#[test]
fn test_non_seekable_output_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    create_random_file(&source_path, 64);

    let result = handle_encode(cli(&source_path, dir.path(), false, false, Width::Auto));

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("seekable regular file"));
    }

    Ok(())
}

/// 压缩模式与固定宽度组合时同样能往返
#[test]
fn test_compressed_round_trip_with_explicit_width() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let source_path = dir.path().join("source.bin");
    let original = b"0123456789abcdef".repeat(300);
    fs::write(&source_path, &original)?;

    let width = Width::Fixed(NonZeroU32::new(8).unwrap());
    let (image_path, restored_path) = round_trip(dir.path(), &source_path, true, width)?;

    let image = fs::read(&image_path)?;
    assert_eq!(u32_at(&image, 18), 8);
    assert_eq!(u32_at(&image, 2) as usize, image.len());
    assert_eq!(fs::read(&restored_path)?, original);

    Ok(())
}

/// 验证命令行参数的解析结果
#[test]
fn test_cli_parses_flags_and_positionals() {
    let args = Cli::try_parse_from(["bmp-bin", "in.bin", "out.bmp"]).unwrap();
    assert_eq!(args.input, PathBuf::from("in.bin"));
    assert_eq!(args.output, PathBuf::from("out.bmp"));
    assert!(!args.decode);
    assert!(!args.compress);
    assert!(!args.verbose);
    assert_eq!(args.width, Width::Auto);

    let args =
        Cli::try_parse_from(["bmp-bin", "-d", "-c", "-v", "-w", "16", "in.bmp", "out.bin"]).unwrap();
    assert!(args.decode);
    assert!(args.compress);
    assert!(args.verbose);
    assert_eq!(args.width, Width::Fixed(NonZeroU32::new(16).unwrap()));
}

/// 位置参数必须恰好两个
#[test]
fn test_cli_requires_exactly_two_paths() {
    let missing = Cli::try_parse_from(["bmp-bin", "in.bin"]).unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::MissingRequiredArgument);

    let extra = Cli::try_parse_from(["bmp-bin", "a.bin", "b.bmp", "c.bmp"]);
    assert!(extra.is_err(), "A third positional argument must be rejected.");
}

/// 宽度为 0 或非数字时在解析阶段即被拒绝
#[test]
fn test_cli_rejects_invalid_width() {
    let zero = Cli::try_parse_from(["bmp-bin", "-w", "0", "in.bin", "out.bmp"]).unwrap_err();
    assert_eq!(zero.kind(), ErrorKind::ValueValidation);
    assert!(zero.to_string().contains("greater than zero"));

    let word = Cli::try_parse_from(["bmp-bin", "-w", "wide", "in.bin", "out.bmp"]).unwrap_err();
    assert_eq!(word.kind(), ErrorKind::ValueValidation);
}
