//! # audioconv - 多核批量音频转换工具
//!
//! 递归遍历输入目录，按扩展名过滤文件，对每个文件调用一次 ffmpeg，
//! 把重新编码（格式、采样率、位深）后的副本镜像到输出目录。
//!
//! ## 运行模式
//! - 命令行模式：`audioconv IN OUT 'wav|flac' flac 48000 24`
//! - 交互模式：`audioconv --interactive`（无参数时默认）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/    (文件发现与并行调度)
//!   │     ├── encoder/  (ffmpeg 调用)
//!   │     └── models/   (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod encoder;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
