//! # 比特/文本编解码模块
//!
//! 提供文本与比特序列之间的纯转换：每个字节以最高位在前 (MSB first)
//! 的顺序展开为 8 个比特。本模块不做任何 I/O，也不了解图像结构。
//! 文本与字节之间的映射由显式的 [`TextEncoding`] 参数决定，
//! 而不是某个隐含的假设。

use clap::ValueEnum;

use crate::constants::BITS_PER_UNIT;

/// 文本与字节之间的映射策略。
///
/// 两个方向的转换都是全函数：编码与解码永不报错，
/// 超出各自表示范围的输入按下述文档约定退化处理。
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextEncoding {
    /// UTF-8 字节编码。对任意 Rust 字符串可逆；
    /// 解码遇到非法字节序列时以 U+FFFD 替换，不会失败。
    #[default]
    Utf8,

    /// Latin-1 (ISO-8859-1) 单字节编码。码点 0–255 与字节一一对应；
    /// 超出 255 的字符一律编码为 `?`。
    Latin1,
}

impl TextEncoding {
    /// 按当前策略把文本编码为字节序列。
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// 按当前策略把字节序列解码为文本。
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        }
    }
}

/// 把字节序列展开为比特序列：每个字节产生 8 个元素 (0 或 1)，最高位在前。
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * BITS_PER_UNIT);
    for &byte in bytes {
        for shift in (0..BITS_PER_UNIT).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits
}

/// 把比特序列按 8 个一组折叠回字节。
/// 末尾长度不足 8 的残组直接丢弃，而不是报错。
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(BITS_PER_UNIT)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | (bit & 1)))
        .collect()
}

/// 把文本转换为比特序列，顺序与输入一致。
pub fn text_to_bits(message: &str, encoding: TextEncoding) -> Vec<u8> {
    bytes_to_bits(&encoding.encode(message))
}

/// 把比特序列按 8 比特一组还原为文本。
/// 末尾的残组按约定被静默丢弃；本函数永不失败。
pub fn bits_to_text(bits: &[u8], encoding: TextEncoding) -> String {
    encoding.decode(&bits_to_bytes(bits))
}
