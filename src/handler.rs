//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `serve` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心隐写算法以及向用户报告结果。

use crate::cli::{DecodeArgs, EncodeArgs, ServeArgs};
use crate::image_io::{load_image, save_image};
use crate::server::{self, AppState};
use crate::steganography::{decode, encode};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Encode' 命令的执行逻辑。
///
/// 负责读取输入图像、检查隐写空间是否足够、调用隐写核心函数把消息比特写入像素，
/// 最后将结果图像保存到目标路径。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、消息文本和协议参数的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入的图像文件。
/// * 输出文件已存在且未指定 `--force`。
/// * 图像的像素数不足以容纳消息与结束标记。
/// * 无法写入到目标图像文件。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let marker = args.codec.marker();
    let mut image = load_image(&args.image)?;

    let dest = args
        .output
        .clone()
        .unwrap_or_else(|| default_encode_dest(&args.image));
    ensure_writable(&dest, args.force)?;

    encode(
        &mut image,
        &args.message,
        args.codec.channel,
        &marker,
        args.codec.encoding,
    )
    .map_err(|err| {
        anyhow::anyhow!(
            "Not enough space in the image to hide the message. \nRequired: {} bits, Available: {} bits",
            err.required.to_string().red().bold(),
            err.available.to_string().green().bold()
        )
    })?;

    save_image(&image, &dest)?;

    println!(
        "The message has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用提取核心函数扫描结束标记并还原消息文本，
/// 然后将消息打印到标准输出或写入目标文本文件。
///
/// 图像中找不到结束标记时不视为错误：打印一条提示后正常退出。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径和协议参数的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取或解码输入的图像文件。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法写入到目标文本文件。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let marker = args.codec.marker();
    let image = load_image(&args.image)?;

    let Some(message) = decode(&image, args.codec.channel, &marker, args.codec.encoding) else {
        println!(
            "No hidden message was found in: {}",
            args.image.to_string_lossy().yellow().bold()
        );
        return Ok(());
    };

    match &args.output {
        Some(dest) => {
            ensure_writable(dest, args.force)?;
            fs::write(dest, &message).with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    dest.to_string_lossy().red().bold()
                )
            })?;
            println!(
                "The message has been successfully recovered and saved: {}",
                dest.to_string_lossy().green().bold()
            );
        }
        None => {
            println!("{}", "Recovered message:".green().bold());
            println!("{message}");
        }
    }

    Ok(())
}

/// 处理 'Serve' 命令的执行逻辑。
///
/// 用命令行指定的协议参数构建服务状态，随后搭建多线程异步运行时
/// 并在其上阻塞运行 HTTP API 服务，直到进程被终止。
///
/// # Arguments
///
/// * `args` - 包含监听端口和协议参数的 `ServeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 异步运行时构建失败。
/// * 监听端口被占用或服务意外退出。
pub fn handle_serve(args: ServeArgs) -> Result<()> {
    let state = AppState {
        channel: args.codec.channel,
        marker: args.codec.marker(),
        encoding: args.codec.encoding,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build the async runtime for the HTTP server")?
        .block_on(server::serve(args.port, state))
}

/// 根据输入路径推导默认的输出路径，形如 `encoded_<原文件名>.png`。
///
/// 结果图像必须以无损格式保存，因此扩展名固定为 `.png`。
fn default_encode_dest(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"));
    input.with_file_name(format!("encoded_{stem}.png"))
}

/// 确认目标路径可以安全写入。
///
/// # Errors
///
/// 目标文件已存在且 `force` 为 `false` 时返回错误。
fn ensure_writable(dest: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !dest.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );
    Ok(())
}
