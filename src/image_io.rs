//! # 图像读写模块
//!
//! 核心算法只消费和产出已解码的 RGBA 像素网格；本模块负责网格与
//! 文件、内存字节流之间的转换。依赖声明里只编译了无损编解码器
//! (PNG, BMP, TIFF, WebP, QOI)：有损再编码会破坏隐藏的 LSB，
//! 所以保存路径在构建期就不可能产出有损文件。

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use image::{ImageFormat, RgbaImage};

/// 从路径加载图像并统一为 RGBA8 像素网格。
///
/// 没有 alpha 通道的图像会获得不透明 alpha；核心算法永远不改动它。
///
/// # Errors
///
/// 文件不存在、不可读或不是受支持的图像格式时返回错误。
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    Ok(image.to_rgba8())
}

/// 从内存中的字节流（例如 HTTP 上传）解码图像。
///
/// # Errors
///
/// 字节流不是可解码的图像时返回错误。
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes)
        .context("The uploaded bytes are not a decodable image.")?;
    Ok(image.to_rgba8())
}

/// 把像素网格保存到路径，格式由扩展名决定。
///
/// # Errors
///
/// 扩展名不属于已编译的无损格式，或写入失败时返回错误。
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<()> {
    image.save(path).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 把像素网格编码为 PNG 字节流，用于 HTTP 响应体。
///
/// # Errors
///
/// PNG 编码失败时返回错误。
pub fn to_png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("Failed to encode the image as PNG.")?;
    Ok(bytes)
}
