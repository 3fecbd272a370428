//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser};
use std::path::PathBuf;

use crate::bits::TextEncoding;
use crate::constants::DEFAULT_PORT;
use crate::marker::Marker;
use crate::steganography::Channel;

/// 一款基于 LSB (最低有效位) 隐写术的工具，用于把文本消息藏进无损格式图像 (如 PNG, BMP) 的像素中，或从中提取。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 LSB (最低有效位) 隐写术的工具，用于把文本消息藏进无损格式图像 (如 PNG, BMP) 的像素中，或从中提取。提供命令行与 HTTP API 两种入口。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (嵌入)、decode (提取) 和 serve (HTTP 服务)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把一条文本消息嵌入无损格式图像 (如 PNG, BMP) 的像素中。
    Encode(EncodeArgs),

    /// 从经过隐写的图像中提取隐藏的消息。
    Decode(DecodeArgs),

    /// 启动提供 encode/decode 端点的 HTTP API 服务。
    Serve(ServeArgs),
}

/// 编解码协议参数，encode/decode/serve 三个子命令共用。
///
/// 嵌入与提取两端必须使用一致的参数，否则提取端会认错或找不到标记。
#[derive(Args, Debug)]
pub struct CodecOpts {
    /// 承载隐藏比特的颜色通道。
    #[arg(long, value_enum, default_value_t = Channel::Blue)]
    pub channel: Channel,

    /// 用作结束标记的文本，按 UTF-8 字节展开为比特模式；
    /// 省略时使用默认标记 (8 个零比特)。
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub marker: Option<String>,

    /// 文本与字节之间的映射策略。
    #[arg(long, value_enum, default_value_t = TextEncoding::Utf8)]
    pub encoding: TextEncoding,
}

impl CodecOpts {
    /// 把命令行里的标记参数解析为核心层的标记值。
    pub fn marker(&self) -> Marker {
        match &self.marker {
            Some(text) => Marker::from_text(text),
            None => Marker::default(),
        }
    }
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 用于隐写的输入图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要嵌入的消息文本。
    #[arg(short, long)]
    pub message: String,

    /// 结果图像的输出路径；省略时在输入文件旁生成 `encoded_<原名>.png`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub codec: CodecOpts,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 已嵌入消息的隐写图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 把提取出的消息写入该文件；省略时只打印到标准输出。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub codec: CodecOpts,
}

/// 'serve' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// HTTP 服务监听的端口。
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub codec: CodecOpts,
}
