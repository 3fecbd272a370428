use clap::Parser;

use lsb_stash::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode, handle_serve},
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`encode`、`decode` 或 `serve`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 日志级别通过 RUST_LOG 环境变量控制
    env_logger::init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
        Commands::Serve(args) => handle_serve(args),
    }
}
