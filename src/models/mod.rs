//! # 数据模型模块
//!
//! 定义转换设置、作业、结果以及格式/扩展名过滤器。
//!
//! ## 依赖关系
//! - 被 `batch/`, `encoder/` 和 `commands/` 使用
//! - 子模块: format, job

pub mod format;
pub mod job;

pub use format::{ExtensionFilter, FormatKind, OutputFormat, COMMON_AUDIO_EXTENSIONS};
pub use job::{ConversionJob, ConversionResult, Plan, Settings};
