//! # 结束标记模块
//!
//! 定义编码端与解码端事先约定的结束标记，以及解码端使用的增量
//! 后缀匹配器。标记在每次调用时显式传入，不存在任何全局标记状态，
//! 因此多套标记方案可以共存并被独立测试。

use crate::bits::bytes_to_bits;
use crate::constants::END_MARKER;

/// 事先约定的结束标记：一段固定的比特模式，紧跟在载荷比特之后，
/// 向解码端宣告"隐藏数据到此结束"。
///
/// 标记没有转义机制：载荷自身的比特流中同样可能出现与标记一致的
/// 片段，此时解码会提前截断。这是方案的已知局限，而不是待修的缺陷。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Marker {
    bits: Vec<u8>,
}

impl Marker {
    /// 用原始比特模式构造标记。
    ///
    /// # Panics
    ///
    /// 模式为空或含有 0/1 以外的元素时 panic：空标记会在读到任何
    /// 比特之前就"匹配成功"，属于调用方的编程错误。
    pub fn from_bits(bits: &[u8]) -> Self {
        assert!(!bits.is_empty(), "marker bit pattern must not be empty");
        assert!(
            bits.iter().all(|&bit| bit <= 1),
            "marker bit pattern may only contain 0 and 1"
        );
        Self {
            bits: bits.to_vec(),
        }
    }

    /// 用文本字面量构造标记：文本按 UTF-8 字节展开为比特模式。
    ///
    /// # Panics
    ///
    /// 文本为空时 panic，理由同 [`Marker::from_bits`]。
    pub fn from_text(text: &str) -> Self {
        Self::from_bits(&bytes_to_bits(text.as_bytes()))
    }

    /// 标记的比特长度。
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// 标记的比特模式。
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }
}

impl Default for Marker {
    /// 默认标记：[`END_MARKER`]，即 8 个零比特。
    fn default() -> Self {
        Self::from_bits(&END_MARKER)
    }
}

/// 解码端的增量后缀匹配器。
///
/// 逐比特接收解码端读出的 LSB 流，在"已累积序列的后缀恰好等于标记
/// 模式"的第一时间给出判定。内部维护标记的 KMP 前缀函数表，每个
/// 比特的均摊代价为 O(1)，避免在每个像素上对整段累积序列重做后缀
/// 比较。
pub struct MarkerScanner<'a> {
    pattern: &'a [u8],
    /// 前缀函数表：`failure[i]` 是 `pattern[..=i]` 最长真前后缀的长度。
    failure: Vec<usize>,
    matched: usize,
}

impl<'a> MarkerScanner<'a> {
    /// 为给定标记构建匹配器并预计算前缀函数表。
    pub fn new(marker: &'a Marker) -> Self {
        let pattern = marker.bits();
        let mut failure = vec![0usize; pattern.len()];
        let mut k = 0;
        for i in 1..pattern.len() {
            while k > 0 && pattern[k] != pattern[i] {
                k = failure[k - 1];
            }
            if pattern[k] == pattern[i] {
                k += 1;
            }
            failure[i] = k;
        }
        Self {
            pattern,
            failure,
            matched: 0,
        }
    }

    /// 送入流中的下一个比特；当且仅当累积序列的后缀在此刻恰好构成
    /// 完整标记时返回 `true`。
    pub fn push(&mut self, bit: u8) -> bool {
        while self.matched > 0 && self.pattern[self.matched] != bit {
            self.matched = self.failure[self.matched - 1];
        }
        if self.pattern[self.matched] == bit {
            self.matched += 1;
        }
        if self.matched == self.pattern.len() {
            // 回退到最长前后缀，便于继续识别重叠的后续出现
            self.matched = self.failure[self.matched - 1];
            return true;
        }
        false
    }
}
