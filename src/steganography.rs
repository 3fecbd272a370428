//! # LSB 隐写核心模块
//!
//! 编码端与解码端共享同一条协议约定：按行优先顺序（y 外层、x 内层，
//! 从左上到右下）逐像素扫描，每个像素只动指定通道的最低有效位。
//! `ImageBuffer` 的原生像素迭代顺序正是这一顺序，两端都依赖它：
//! 扫描顺序是协议的一部分，不是实现细节。
//!
//! 核心不做任何 I/O：编码端独占借用一个已解码的像素网格并就地修改，
//! 解码端只读借用。结束标记、指定通道与文本映射策略全部由调用方
//! 在调用时显式传入。

use clap::ValueEnum;
use image::RgbaImage;
use log::debug;

use crate::bits::{TextEncoding, bits_to_text, text_to_bits};
use crate::capacity::{CapacityError, check_capacity};
use crate::marker::{Marker, MarkerScanner};

/// 承载隐藏比特的指定颜色通道。
///
/// Alpha 不在枚举之内：它永远原样保留，连类型上都无法被指定。
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Channel {
    /// 红色通道。
    Red,
    /// 绿色通道。
    Green,
    /// 蓝色通道（默认）。
    #[default]
    Blue,
}

impl Channel {
    /// 通道在 RGBA 像素中的下标。
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// 把文本消息嵌入图像中指定通道的最低有效位。
///
/// 载荷 = 消息比特流 + 结束标记。容量校验发生在任何像素被修改之前；
/// 校验失败时网格保持原样。载荷写完后剩余像素不再被触碰，其余比特
/// 与其余通道始终逐位不变。
///
/// # Errors
///
/// 载荷比特数（含结束标记）超过 `width * height` 时返回
/// [`CapacityError`]，此时图像未被改动。
pub fn encode(
    image: &mut RgbaImage,
    message: &str,
    channel: Channel,
    marker: &Marker,
    encoding: TextEncoding,
) -> Result<(), CapacityError> {
    let mut payload = text_to_bits(message, encoding);
    payload.extend_from_slice(marker.bits());

    check_capacity(payload.len() as u64, image.width(), image.height())?;

    debug!(
        "embedding {} payload bits into a {}x{} image ({:?} channel)",
        payload.len(),
        image.width(),
        image.height(),
        channel
    );

    let index = channel.index();
    for (&bit, pixel) in payload.iter().zip(image.pixels_mut()) {
        pixel[index] = (pixel[index] & 0xFE) | bit;
    }

    Ok(())
}

/// 从图像中按与编码端相同的扫描顺序提取隐藏消息。
///
/// 逐像素取出指定通道的 LSB 并累积；一旦累积序列的后缀与结束标记
/// 吻合，立即剥掉标记、把剩余比特还原为文本返回，不再继续扫到
/// 图像末尾。整幅图像扫完都没有出现标记时返回 `None`：这是正常
/// 结果而非故障，图里本来就可能没藏任何东西。
pub fn decode(
    image: &RgbaImage,
    channel: Channel,
    marker: &Marker,
    encoding: TextEncoding,
) -> Option<String> {
    let index = channel.index();
    let mut scanner = MarkerScanner::new(marker);
    let mut bits: Vec<u8> = Vec::new();

    for pixel in image.pixels() {
        let bit = pixel[index] & 1;
        bits.push(bit);
        if scanner.push(bit) {
            bits.truncate(bits.len() - marker.bit_len());
            debug!("marker found, payload is {} bits", bits.len());
            return Some(bits_to_text(&bits, encoding));
        }
    }

    debug!("scanned {} pixels without finding the marker", bits.len());
    None
}
