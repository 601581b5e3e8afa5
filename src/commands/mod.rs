//! # 命令执行模块
//!
//! 根据命令行参数选择命令行模式或交互模式。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `encoder/`, `models/`, `utils/`
//! - 子模块: convert, interactive

pub mod convert;
pub mod interactive;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
///
/// 指定 `--interactive` 或完全没有位置参数时进入交互模式。
pub fn run(cli: Cli) -> Result<()> {
    if cli.interactive || cli.has_no_positionals() {
        interactive::execute(&cli)
    } else {
        convert::execute(cli)
    }
}
