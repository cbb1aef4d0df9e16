//! # 像素流转码模块
//!
//! 在原始字节流与 BMP 像素区之间搬运载荷，可选地经过 bzip2 压缩。
//!
//! 压缩模式下，编码器输出的前 3 个字节 (`BZh` 魔数) 不写入文件；
//! 解码时再把它拼回载荷前面交给解压器。

use crate::constants::{HEADER_SIZE, PREAMBLE};
use crate::error::{Error, Result};
use crate::header::{Header, Width};
use bzip2::Compression;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// 编码选项。
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    pub compress: bool,
    pub width: Width,
}

/// 编码结果：回写后的最终头部，以及写入像素区的载荷字节数。
#[derive(Debug, Clone, Copy)]
pub struct EncodeReport {
    pub header: Header,
    pub payload_len: u64,
}

/// 解码结果。
#[derive(Debug, Clone, Copy)]
pub struct DecodeReport {
    pub header: Header,
    /// 从像素区读出的载荷字节数 (不含填充)。
    pub payload_len: u64,
    /// 写入目标的字节数，压缩模式下即解压后的长度。
    pub restored: u64,
}

/// 丢弃最先写入的 `PREAMBLE.len()` 个字节，其余原样转发给内部写入器。
///
/// 被丢弃的字节可以分散在任意多次 `write` 调用中；
/// 跨越边界的单次写入会被拆开，只转发边界之后的部分。
pub struct StripPreamble<W> {
    inner: W,
    pos: u64,
}

impl<W: Write> StripPreamble<W> {
    pub fn new(inner: W) -> Self {
        StripPreamble { inner, pos: 0 }
    }

    /// 实际转发到内部写入器的字节数。
    pub fn passed_through(&self) -> u64 {
        self.pos.saturating_sub(PREAMBLE.len() as u64)
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for StripPreamble<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = (PREAMBLE.len() as u64).saturating_sub(self.pos);
        let skip = remaining.min(buf.len() as u64) as usize;
        self.pos += skip as u64;

        if skip == 0 {
            let n = self.inner.write(buf)?;
            self.pos += n as u64;
            return Ok(n);
        }
        if skip == buf.len() {
            return Ok(skip);
        }

        // 转发失败时整次写入视为未发生，重试时会重新丢弃同样的前导字节
        match self.inner.write(&buf[skip..]) {
            Ok(n) => {
                self.pos += n as u64;
                Ok(skip + n)
            }
            Err(e) => {
                self.pos -= skip as u64;
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// 将 `input` 编码为 BMP 容器写入 `output`。
///
/// 先写出临时头部，再把载荷 (原始或压缩后) 流式写入像素区，
/// 计算几何尺寸并补齐填充，最后回到文件开头重写头部。
/// 因此 `output` 必须支持随机定位。
///
/// # Errors
///
/// * 读写或压缩过程中的 I/O 错误。
/// * 载荷过大，无法用 32 位头部字段描述 (`Error::ImageTooLarge`)。
pub fn encode<R, W>(input: &mut R, output: &mut W, options: EncodeOptions) -> Result<EncodeReport>
where
    R: Read,
    W: Write + Seek,
{
    let mut header = Header::provisional();
    header.write_to(output)?;

    let payload_len = if options.compress {
        compress_into(input, output)?
    } else {
        io::copy(input, output)?
    };

    header.finalize(payload_len, options.width)?;
    io::copy(&mut io::repeat(0).take(u64::from(header.padding())), output)?;

    output.seek(SeekFrom::Start(0))?;
    header.write_to(output)?;
    output.flush()?;

    Ok(EncodeReport {
        header,
        payload_len,
    })
}

/// 压缩 `input` 并写入 `output`，返回去掉前导魔数后实际写入的字节数。
fn compress_into<R: Read, W: Write>(input: &mut R, output: &mut W) -> Result<u64> {
    let mut encoder = BzEncoder::new(StripPreamble::new(output), Compression::best());
    io::copy(input, &mut encoder)?;
    let sink = encoder.finish()?;
    Ok(sink.passed_through())
}

/// 读取并校验容器头部，之后 `input` 停在像素区起点。
///
/// # Errors
///
/// * 文件不足 54 字节 (`Error::TruncatedHeader`)。
/// * 头部声明的文件大小与实际不符 (`Error::SizeMismatch`)。
pub fn read_header<R: Read + Seek>(input: &mut R) -> Result<Header> {
    let actual = input.seek(SeekFrom::End(0))?;
    input.seek(SeekFrom::Start(0))?;

    if actual < HEADER_SIZE as u64 {
        return Err(Error::TruncatedHeader { actual });
    }

    let header = Header::read_from(input)?;
    header.validate(actual)?;
    Ok(header)
}

/// 从像素区恢复载荷并写入 `output`。
///
/// 只读取 `header` 声明的载荷字节，末尾的填充从不读取。
/// 调用前 `input` 须位于像素区起点 (见 [`read_header`])。
///
/// # Errors
///
/// * 填充字段损坏 (`Error::CorruptPadding`)。
/// * 原始模式下像素区提前结束 (`Error::ShortRead`)。
/// * 解压失败或其他 I/O 错误。
pub fn decode_payload<R, W>(
    input: &mut R,
    header: &Header,
    output: &mut W,
    compress: bool,
) -> Result<DecodeReport>
where
    R: Read,
    W: Write,
{
    let payload_len = header.payload_len()?;
    let mut region = input.by_ref().take(payload_len);

    let restored = if compress {
        let preamble: &[u8] = &PREAMBLE;
        let mut decoder = BzDecoder::new(preamble.chain(region));
        io::copy(&mut decoder, output)?
    } else {
        let copied = io::copy(&mut region, output)?;
        if copied < payload_len {
            return Err(Error::ShortRead {
                expected: payload_len,
                copied,
            });
        }
        copied
    };
    output.flush()?;

    Ok(DecodeReport {
        header: *header,
        payload_len,
        restored,
    })
}

/// 读取头部并恢复载荷，等价于依次调用 [`read_header`] 与 [`decode_payload`]。
pub fn decode<R, W>(input: &mut R, output: &mut W, compress: bool) -> Result<DecodeReport>
where
    R: Read + Seek,
    W: Write,
{
    let header = read_header(input)?;
    decode_payload(input, &header, output, compress)
}
