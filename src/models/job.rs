//! # 转换作业数据模型
//!
//! 全局设置、单文件转换作业与转换结果。
//!
//! ## 依赖关系
//! - 被 `batch/`, `encoder/`, `commands/` 使用
//! - 使用 `models/format.rs`

use super::format::{ExtensionFilter, OutputFormat};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 一次运行的全局设置，启动后不再变化
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub extension_filter: ExtensionFilter,
    pub output_format: OutputFormat,
    pub sample_rate: u32,
    pub bit_depth: u32,
    pub workers: usize,
}

/// 单个文件的转换请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub target_path: PathBuf,
    pub output_format: OutputFormat,
    pub sample_rate: u32,
    pub bit_depth: u32,
}

impl ConversionJob {
    /// 由源文件和全局设置构造作业
    ///
    /// 目标路径 = output_root / (source 相对 input_root 的路径)，扩展名替换为输出格式。
    /// 源文件不在 input_root 之下时返回 `None`。
    pub fn from_source(source: &Path, settings: &Settings) -> Option<Self> {
        let relative = source.strip_prefix(&settings.input_root).ok()?;
        if relative.as_os_str().is_empty() {
            return None;
        }
        let target_path = settings
            .output_root
            .join(relative)
            .with_extension(settings.output_format.as_str());

        Some(ConversionJob {
            source_path: source.to_path_buf(),
            relative_path: relative.to_path_buf(),
            target_path,
            output_format: settings.output_format.clone(),
            sample_rate: settings.sample_rate,
            bit_depth: settings.bit_depth,
        })
    }

    /// 目标扩展名与源文件相同（不区分大小写）
    fn keeps_extension(&self) -> bool {
        self.source_path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case(self.output_format.as_str()))
    }
}

/// 单个作业的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub succeeded: bool,
    pub error_detail: Option<String>,
}

impl ConversionResult {
    pub fn success(job: &ConversionJob) -> Self {
        ConversionResult {
            source_path: job.source_path.clone(),
            target_path: job.target_path.clone(),
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(job: &ConversionJob, detail: impl Into<String>) -> Self {
        ConversionResult {
            source_path: job.source_path.clone(),
            target_path: job.target_path.clone(),
            succeeded: false,
            error_detail: Some(detail.into()),
        }
    }

    /// 错误信息（成功时为空串）
    pub fn detail(&self) -> &str {
        self.error_detail.as_deref().unwrap_or("")
    }
}

/// 作业规划结果
#[derive(Debug, Default)]
pub struct Plan {
    /// 可执行的作业
    pub jobs: Vec<ConversionJob>,
    /// 规划阶段即被拒绝的文件（目标冲突、目标与源相同等）
    pub rejected: Vec<ConversionResult>,
}

impl Settings {
    /// 将发现的文件列表规划为作业
    ///
    /// 按输入顺序处理，先到者占用目标路径；后续冲突的文件记为失败结果。
    pub fn plan(&self, files: &[PathBuf]) -> Plan {
        let mut plan = Plan::default();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        let same_tree = self.roots_coincide();

        for source in files {
            let Some(job) = ConversionJob::from_source(source, self) else {
                plan.rejected.push(ConversionResult {
                    source_path: source.clone(),
                    target_path: PathBuf::new(),
                    succeeded: false,
                    error_detail: Some(format!(
                        "not located under input directory {}",
                        self.input_root.display()
                    )),
                });
                continue;
            };

            if job.target_path == job.source_path || (same_tree && job.keeps_extension()) {
                plan.rejected
                    .push(ConversionResult::failure(&job, "target would overwrite the source file"));
                continue;
            }

            if let Some(first) = claimed.get(&job.target_path) {
                let detail = format!("target already produced from {}", first.display());
                plan.rejected.push(ConversionResult::failure(&job, detail));
                continue;
            }

            claimed.insert(job.target_path.clone(), job.source_path.clone());
            plan.jobs.push(job);
        }

        plan
    }

    /// 输入与输出根目录是否指向同一位置（解析 `.`、`..` 与符号链接后比较）
    pub fn roots_coincide(&self) -> bool {
        if self.input_root == self.output_root {
            return true;
        }
        match (
            fs::canonicalize(&self.input_root),
            fs::canonicalize(&self.output_root),
        ) {
            (Ok(input), Ok(output)) => input == output,
            _ => false,
        }
    }
}
