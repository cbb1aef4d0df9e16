/// BMP 文件头签名。
pub const SIGNATURE: [u8; 2] = *b"BM";

/// 文件头 (14 字节) 与信息头 (40 字节) 的总大小，像素数据紧随其后。
pub const HEADER_SIZE: usize = 54;

/// `BITMAPINFOHEADER` 的固定长度。
pub const INFO_HEADER_SIZE: u32 = 40;

/// 颜色平面数，BMP 格式要求恒为 1。
pub const COLOR_PLANES: u16 = 1;

/// 每个像素占用的位数：蓝、绿、红各一字节，外加一个被忽略的字节。
pub const BITS_PER_PIXEL: u16 = 32;

/// 每个像素承载的载荷字节数。
pub const BYTES_PER_PIXEL: u64 = 4;

/// bzip2 压缩流的固定前导魔数。
/// 编码时丢弃，解码时重新拼接到载荷之前。
pub const PREAMBLE: [u8; 3] = *b"BZh";
