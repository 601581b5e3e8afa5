//! # ffmpeg 参数构造
//!
//! 按输出格式与位深生成编码参数，并拼装完整的 ffmpeg 参数列表。
//!
//! ## 依赖关系
//! - 被 `encoder/mod.rs` 使用
//! - 使用 `models/` 的作业与格式类型

use crate::models::{ConversionJob, FormatKind, OutputFormat};

use std::ffi::OsString;

/// mp3 的位深到码率换算系数 (kbit/s per bit)
const MP3_KBPS_PER_BIT: u32 = 8;

/// mp3 码率：位深 × 8，单位 kbit/s
pub fn mp3_bitrate(bit_depth: u32) -> String {
    format!("{}k", bit_depth.saturating_mul(MP3_KBPS_PER_BIT))
}

/// 按输出格式生成位深/码率相关参数
///
/// 24 位无损沿用 32 位采样容器，并用 `-bits_per_raw_sample 24` 标记有效位数。
pub fn format_args(format: &OutputFormat, bit_depth: u32) -> Vec<String> {
    let args: &[&str] = match format.kind() {
        FormatKind::Lossless => match bit_depth {
            16 => &["-sample_fmt", "s16"],
            24 => &["-sample_fmt", "s32", "-bits_per_raw_sample", "24"],
            32 => &["-sample_fmt", "s32"],
            _ => &[],
        },
        FormatKind::Mp3 => return vec!["-b:a".to_string(), mp3_bitrate(bit_depth)],
        FormatKind::Other => &["-q:a", "0"],
    };
    args.iter().map(|s| s.to_string()).collect()
}

/// 拼装完整参数：`-y -v error -i <src> -ar <rate> [格式参数] -f <format> <target>`
pub fn build_args(job: &ConversionJob) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        job.source_path.clone().into_os_string(),
        "-ar".into(),
        job.sample_rate.to_string().into(),
    ];
    args.extend(
        format_args(&job.output_format, job.bit_depth)
            .into_iter()
            .map(OsString::from),
    );
    args.push("-f".into());
    args.push(job.output_format.as_str().into());
    args.push(job.target_path.clone().into_os_string());
    args
}
