//! # 编码器调用模块
//!
//! 每个作业调用一次外部编码器 (ffmpeg)，把退出状态映射为转换结果。
//!
//! ## 功能
//! - 定位编码器程序（显式路径或 PATH 搜索）
//! - 构造命令行并确保目标父目录存在
//! - 运行子进程，失败时附带 stderr 文本
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 子模块: args, process
//! - 使用 `which` 在 PATH 中查找 ffmpeg

pub mod args;
pub mod process;

use crate::batch::CancelToken;
use crate::error::{AudioconvError, Result};
use crate::models::{ConversionJob, ConversionResult};
use process::ProcessOutcome;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 默认编码器程序名
pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// 外部编码器
#[derive(Debug, Clone)]
pub struct Encoder {
    program: PathBuf,
}

impl Encoder {
    /// 使用给定程序路径创建编码器（不检查是否存在）
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 定位编码器程序
    ///
    /// 显式给出且存在的文件解析为绝对路径使用，否则按名字在 PATH 中查找。
    /// 未显式指定时只查 PATH，当前目录下同名文件不会被选中。
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit.filter(|p| p.is_file()) {
            // `Command::new("ffmpeg")` 会搜索 PATH，必须传入带目录的路径
            if let Ok(resolved) = fs::canonicalize(path) {
                return Ok(Self::new(resolved));
            }
        }

        let wanted = explicit.unwrap_or_else(|| Path::new(DEFAULT_PROGRAM));
        which::which(wanted)
            .map(Self::new)
            .map_err(|_| AudioconvError::CommandNotFound {
                command: wanted.display().to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// 构造作业对应的命令
    pub fn command(&self, job: &ConversionJob) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args::build_args(job));
        cmd
    }

    /// 用于显示的命令行文本
    pub fn command_line(&self, job: &ConversionJob) -> String {
        let mut parts = vec![quote(&self.program.to_string_lossy())];
        parts.extend(
            args::build_args(job)
                .iter()
                .map(|a| quote(&a.to_string_lossy())),
        );
        parts.join(" ")
    }

    /// 执行一次转换，所有失败都记录在返回的结果中
    pub fn invoke(&self, job: &ConversionJob, cancel: &CancelToken) -> ConversionResult {
        if let Some(parent) = job.target_path.parent() {
            // 并发创建同一目录时 create_dir_all 视为成功
            if let Err(e) = fs::create_dir_all(parent) {
                return ConversionResult::failure(
                    job,
                    format!("failed to create directory {}: {}", parent.display(), e),
                );
            }
        }

        match process::run(self.command(job), cancel) {
            Ok(ProcessOutcome::Succeeded) => ConversionResult::success(job),
            Ok(ProcessOutcome::Failed { status, stderr }) => {
                let stderr = stderr.trim();
                let detail = if stderr.is_empty() {
                    format!("{} failed ({})", self.name(), status)
                } else {
                    format!("{} failed ({})\n{}", self.name(), status, stderr)
                };
                ConversionResult::failure(job, detail)
            }
            Ok(ProcessOutcome::Cancelled) => ConversionResult::failure(job, "cancelled"),
            Err(e) => ConversionResult::failure(
                job,
                format!("failed to run {}: {}", self.program.display(), e),
            ),
        }
    }

    fn name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
    }
}

/// 含空白或引号的参数加上单引号
fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
