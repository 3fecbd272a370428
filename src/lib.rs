//! # lsb_stash 库
//!
//! 本库包含 LSB 隐写工具的核心逻辑：比特编解码、结束标记匹配、
//! 容量校验、像素级嵌入/提取，以及命令行与 HTTP 两层入口。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod cli;
pub mod constants;
pub mod handler;
pub mod image_io;
pub mod marker;
pub mod server;
pub mod steganography;
