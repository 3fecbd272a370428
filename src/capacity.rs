//! # 容量校验模块
//!
//! 图像的嵌入容量为每像素 1 比特（只动指定通道的最低有效位），
//! 即 `width * height` 比特。校验必须发生在任何像素被修改之前：
//! 要么整段载荷放得下，要么一个比特都不写。

use thiserror::Error;

/// 载荷比特数超出图像容量时的类型化错误。
///
/// 携带所需与可用的比特数，由调用层决定呈现方式：CLI 映射为
/// "Not enough space" 报告，HTTP 映射为 400 响应。
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("the payload needs {required} bits but the image only holds {available}")]
pub struct CapacityError {
    /// 载荷（消息比特 + 结束标记）所需的比特数。
    pub required: u64,
    /// 图像可容纳的比特数，即 `width * height`。
    pub available: u64,
}

/// 图像的嵌入容量（比特数）：每像素 1 比特。
pub fn capacity_bits(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height)
}

/// 校验载荷是否放得下；超出容量时返回 [`CapacityError`]。
pub fn check_capacity(payload_bits: u64, width: u32, height: u32) -> Result<(), CapacityError> {
    let available = capacity_bits(width, height);
    if payload_bits > available {
        return Err(CapacityError {
            required: payload_bits,
            available,
        });
    }
    Ok(())
}
