//! # BMP 头部模块
//!
//! 负责根据载荷长度推导图像几何尺寸，并读写 54 字节的小端序容器头部。
//!
//! 头部中的两个分辨率字段被挪作他用：它们记录了载荷之后追加的填充字节数，
//! 解码时据此截掉像素区末尾的填充，恢复出原始载荷长度。

use crate::constants::{
    BITS_PER_PIXEL, BYTES_PER_PIXEL, COLOR_PLANES, HEADER_SIZE, INFO_HEADER_SIZE, SIGNATURE,
};
use crate::error::{Error, Result};
use std::io::{Read, Write};
use std::num::NonZeroU32;
use std::str::FromStr;

/// 输出图像的宽度：自动推导，或由用户指定的固定像素数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    #[default]
    Auto,
    Fixed(NonZeroU32),
}

impl FromStr for Width {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Width::Auto);
        }
        let value: u32 = s.parse().map_err(|_| Error::InvalidWidth {
            value: s.to_string(),
        })?;
        NonZeroU32::new(value).map(Width::Fixed).ok_or(Error::ZeroWidth)
    }
}

/// 自动推导图像宽度。
///
/// 两处 `& !4` 清除的是第 2 位，并不是向上取整到 4 的倍数。
/// 既有文件的几何尺寸依赖这一运算，必须逐位保持一致。
///
/// 空载荷会得到 0，此时返回 1。
pub fn auto_width(total: u64) -> u32 {
    let ntotal = (total + 4) & !4;
    let side = (ntotal as f64 / 3.0).sqrt().ceil() as u32;
    (side.saturating_add(4) & !4).max(1)
}

/// 54 字节的容器头部 (14 字节文件头 + 40 字节 `BITMAPINFOHEADER`)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: [u8; 2],
    pub file_size: u32,
    pub reserved: [u8; 4],
    pub pixel_offset: u32,
    pub info_size: u32,
    pub width: u32,
    pub height: u32,
    pub color_planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    /// 填充字节数 (挪用水平分辨率字段)。
    pub x_resolution: u32,
    /// 填充字节数 (挪用垂直分辨率字段)，解码时读取此字段。
    pub y_resolution: u32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl Header {
    /// 构造一个临时头部：结构常量已就位，尺寸相关字段为零。
    ///
    /// 编码时先写出它占位，待载荷长度确定后再由 [`Header::finalize`] 补全并回写。
    pub fn provisional() -> Self {
        Header {
            signature: SIGNATURE,
            file_size: HEADER_SIZE as u32,
            reserved: [0; 4],
            pixel_offset: HEADER_SIZE as u32,
            info_size: INFO_HEADER_SIZE,
            width: 0,
            height: 0,
            color_planes: COLOR_PLANES,
            bits_per_pixel: BITS_PER_PIXEL,
            compression: 0,
            image_size: 0,
            x_resolution: 0,
            y_resolution: 0,
            colors_used: 0,
            colors_important: 0,
        }
    }

    /// 根据实际写入的载荷字节数计算宽、高、填充以及各个大小字段。
    ///
    /// # Arguments
    ///
    /// * `total` - 写入像素区的载荷字节数 (压缩模式下不含被丢弃的前导魔数)。
    /// * `width` - 固定宽度原样使用，即使图像因此不再接近正方形；
    ///   `Width::Auto` 则由 [`auto_width`] 推导。
    ///
    /// # Errors
    ///
    /// 若像素区或文件总大小超出 32 位字段的表示范围，返回 `Error::ImageTooLarge`。
    pub fn finalize(&mut self, total: u64, width: Width) -> Result<()> {
        let width = match width {
            Width::Fixed(w) => w.get(),
            Width::Auto => auto_width(total),
        };
        let too_large = || Error::ImageTooLarge { payload: total };

        let row_bytes = BYTES_PER_PIXEL * u64::from(width);
        let height = total.div_ceil(row_bytes);
        let image_size = height.checked_mul(row_bytes).ok_or_else(too_large)?;

        let height = u32::try_from(height).map_err(|_| too_large())?;
        let image_size = u32::try_from(image_size).map_err(|_| too_large())?;
        let file_size = image_size
            .checked_add(self.pixel_offset)
            .ok_or_else(too_large)?;
        // total <= image_size，因此差值必然落在 u32 范围内
        let padding = (u64::from(image_size) - total) as u32;

        self.width = width;
        self.height = height;
        self.image_size = image_size;
        self.file_size = file_size;
        self.x_resolution = padding;
        self.y_resolution = padding;
        Ok(())
    }

    /// 像素区末尾的填充字节数。
    pub fn padding(&self) -> u32 {
        self.y_resolution
    }

    /// 像素区中真正属于载荷的字节数。
    ///
    /// # Errors
    ///
    /// 当填充字段大于像素区大小时返回 `Error::CorruptPadding`。
    pub fn payload_len(&self) -> Result<u64> {
        self.image_size
            .checked_sub(self.padding())
            .map(u64::from)
            .ok_or(Error::CorruptPadding {
                padding: self.padding(),
                image_size: self.image_size,
            })
    }

    /// 校验头部声明的文件大小与磁盘上的实际大小是否一致。
    ///
    /// 这是唯一的完整性检查，像素内容本身没有校验和。
    pub fn validate(&self, actual: u64) -> Result<()> {
        if u64::from(self.file_size) != actual {
            return Err(Error::SizeMismatch {
                declared: self.file_size,
                actual,
            });
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..2].copy_from_slice(&self.signature);
        buf[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        buf[6..10].copy_from_slice(&self.reserved);
        buf[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        buf[14..18].copy_from_slice(&self.info_size.to_le_bytes());
        buf[18..22].copy_from_slice(&self.width.to_le_bytes());
        buf[22..26].copy_from_slice(&self.height.to_le_bytes());
        buf[26..28].copy_from_slice(&self.color_planes.to_le_bytes());
        buf[28..30].copy_from_slice(&self.bits_per_pixel.to_le_bytes());
        buf[30..34].copy_from_slice(&self.compression.to_le_bytes());
        buf[34..38].copy_from_slice(&self.image_size.to_le_bytes());
        buf[38..42].copy_from_slice(&self.x_resolution.to_le_bytes());
        buf[42..46].copy_from_slice(&self.y_resolution.to_le_bytes());
        buf[46..50].copy_from_slice(&self.colors_used.to_le_bytes());
        buf[50..54].copy_from_slice(&self.colors_important.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([buf[i], buf[i + 1]]);
        let u32_at = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);

        Header {
            signature: [buf[0], buf[1]],
            file_size: u32_at(2),
            reserved: [buf[6], buf[7], buf[8], buf[9]],
            pixel_offset: u32_at(10),
            info_size: u32_at(14),
            width: u32_at(18),
            height: u32_at(22),
            color_planes: u16_at(26),
            bits_per_pixel: u16_at(28),
            compression: u32_at(30),
            image_size: u32_at(34),
            x_resolution: u32_at(38),
            y_resolution: u32_at(42),
            colors_used: u32_at(46),
            colors_important: u32_at(50),
        }
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_SIZE];
        r.read_exact(&mut buf)?;
        Ok(Header::from_bytes(&buf))
    }
}
