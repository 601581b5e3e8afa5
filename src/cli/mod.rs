//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ## 参数结构
//! - 6 个位置参数：输入目录、输出目录、扩展名过滤、输出格式、采样率、位深
//! - `--workers`：并行数
//! - `--interactive` / `--gui`：进入交互模式
//! - 其他运行控制选项
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/`

use crate::models::{ExtensionFilter, OutputFormat};

use clap::Parser;
use std::path::PathBuf;

/// 位置参数的用法提示
pub const USAGE_HINT: &str = "Usage: audioconv INPUT_DIR OUTPUT_DIR EXTENSIONS FORMAT RATE BIT_DEPTH [--workers N]\n       audioconv --interactive  # Launch interactive mode";

/// audioconv - 多核批量音频转换
#[derive(Parser, Debug)]
#[command(name = "audioconv")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Convert audio files recursively with ffmpeg on all cores", long_about = None)]
pub struct Cli {
    /// Input folder
    pub input_dir: Option<PathBuf>,

    /// Output folder
    pub output_dir: Option<PathBuf>,

    /// Extension filter, e.g. 'wav|mp3|flac' or '*'
    #[arg(value_parser = parse_filter)]
    pub exts: Option<ExtensionFilter>,

    /// Output format (e.g. wav, mp3, flac, aiff)
    #[arg(value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Sample rate in Hz (e.g. 44100)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub rate: Option<u32>,

    /// Bit depth (e.g. 16, 24, 32)
    #[arg(value_parser = clap::value_parser!(u32).range(1..=64))]
    pub bit_depth: Option<u32>,

    /// Number of parallel workers (0 = all CPU cores)
    #[arg(short, long, env = "AUDIOCONV_WORKERS", default_value_t = 0)]
    pub workers: usize,

    /// Launch the interactive mode
    #[arg(short, long, visible_alias = "gui", default_value_t = false)]
    pub interactive: bool,

    // ─────────────────────────────────────────────────────────────
    // Run control
    // ─────────────────────────────────────────────────────────────
    /// Path or name of the ffmpeg executable
    #[arg(long, env = "AUDIOCONV_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Continue without asking when the output folder is not empty
    #[arg(short, long, default_value_t = false)]
    pub yes: bool,

    /// Only print the ffmpeg commands, do not run them
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Stop starting new conversions after the first failure
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Write a CSV report with one row per file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Print every ffmpeg command as it starts
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// 没有给出任何位置参数
    pub fn has_no_positionals(&self) -> bool {
        self.input_dir.is_none()
            && self.output_dir.is_none()
            && self.exts.is_none()
            && self.format.is_none()
            && self.rate.is_none()
            && self.bit_depth.is_none()
    }

    /// 缺失的位置参数名
    pub fn missing_positionals(&self) -> Vec<&'static str> {
        let checks = [
            ("INPUT_DIR", self.input_dir.is_none()),
            ("OUTPUT_DIR", self.output_dir.is_none()),
            ("EXTENSIONS", self.exts.is_none()),
            ("FORMAT", self.format.is_none()),
            ("RATE", self.rate.is_none()),
            ("BIT_DEPTH", self.bit_depth.is_none()),
        ];
        checks
            .iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| *name)
            .collect()
    }
}

fn parse_filter(s: &str) -> Result<ExtensionFilter, String> {
    s.parse().map_err(|e: crate::error::AudioconvError| e.to_string())
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: crate::error::AudioconvError| e.to_string())
}
