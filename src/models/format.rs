//! # 格式与扩展名过滤器
//!
//! 输出格式的分类，以及输入文件扩展名过滤器的解析。
//!
//! ## 依赖关系
//! - 被 `models/job.rs`, `batch/collector.rs`, `encoder/` 使用
//! - 被 `cli/` 作为 clap value parser 使用

use crate::error::{AudioconvError, Result};

use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// 交互模式下 "Common audio" 选项对应的扩展名
pub const COMMON_AUDIO_EXTENSIONS: &str = "wav|mp3|flac|aiff|ogg";

/// 输出格式的编码类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// 无损 PCM 容器：wav / aiff / flac
    Lossless,
    /// 有损 mp3，使用码率参数
    Mp3,
    /// 其余格式，使用质量参数
    Other,
}

/// 输出格式（小写格式名，同时作为目标文件扩展名）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputFormat(String);

impl OutputFormat {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 格式分类
    pub fn kind(&self) -> FormatKind {
        match self.0.as_str() {
            "wav" | "aiff" | "flac" => FormatKind::Lossless,
            "mp3" => FormatKind::Mp3,
            _ => FormatKind::Other,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AudioconvError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().trim_start_matches('.').to_ascii_lowercase();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AudioconvError::InvalidFormat(s.to_string()));
        }
        Ok(OutputFormat(name))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 扩展名过滤器
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionFilter {
    /// `*`：匹配所有文件
    All,
    /// 小写扩展名集合（不含前导 `.`）
    Only(BTreeSet<String>),
}

impl ExtensionFilter {
    /// 检查路径的扩展名是否通过过滤器
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            ExtensionFilter::All => true,
            ExtensionFilter::Only(exts) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| exts.contains(&e.to_ascii_lowercase()))
                .unwrap_or(false),
        }
    }
}

impl FromStr for ExtensionFilter {
    type Err = AudioconvError;

    /// 解析 `*` 或 `wav|mp3|flac` 形式的过滤器
    fn from_str(s: &str) -> Result<Self> {
        if s.trim() == "*" {
            return Ok(ExtensionFilter::All);
        }

        let exts: BTreeSet<String> = s
            .split('|')
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        if exts.is_empty() {
            return Err(AudioconvError::InvalidExtensionFilter(s.to_string()));
        }
        Ok(ExtensionFilter::Only(exts))
    }
}

impl std::fmt::Display for ExtensionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtensionFilter::All => write!(f, "*"),
            ExtensionFilter::Only(exts) => {
                let joined: Vec<&str> = exts.iter().map(String::as_str).collect();
                write!(f, "{}", joined.join("|"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extension_filter() {
        assert_eq!("*".parse::<ExtensionFilter>().unwrap(), ExtensionFilter::All);

        let filter: ExtensionFilter = "WAV|.flac| mp3 |".parse().unwrap();
        match &filter {
            ExtensionFilter::Only(exts) => {
                let v: Vec<&str> = exts.iter().map(String::as_str).collect();
                assert_eq!(v, vec!["flac", "mp3", "wav"]);
            }
            ExtensionFilter::All => panic!("expected explicit set"),
        }
        assert_eq!(filter.to_string(), "flac|mp3|wav");

        assert!("".parse::<ExtensionFilter>().is_err());
        assert!("||".parse::<ExtensionFilter>().is_err());
    }

    #[test]
    fn test_filter_matches_case_insensitive() {
        let filter: ExtensionFilter = "wav|flac".parse().unwrap();
        assert!(filter.matches(Path::new("a/x.wav")));
        assert!(filter.matches(Path::new("a/x.WAV")));
        assert!(filter.matches(Path::new("y.Flac")));
        assert!(!filter.matches(Path::new("b/z.txt")));
        assert!(!filter.matches(Path::new("noext")));
        assert!(!filter.matches(Path::new(".wav")));
        assert!(ExtensionFilter::All.matches(Path::new("noext")));
    }

    #[test]
    fn test_output_format_kind() {
        let kind = |s: &str| s.parse::<OutputFormat>().unwrap().kind();
        assert_eq!(kind("wav"), FormatKind::Lossless);
        assert_eq!(kind("AIFF"), FormatKind::Lossless);
        assert_eq!(kind(".flac"), FormatKind::Lossless);
        assert_eq!(kind("mp3"), FormatKind::Mp3);
        assert_eq!(kind("ogg"), FormatKind::Other);
        assert_eq!(kind("m4a"), FormatKind::Other);

        assert!("".parse::<OutputFormat>().is_err());
        assert!("fl/ac".parse::<OutputFormat>().is_err());
        assert!("tar.gz".parse::<OutputFormat>().is_err());
    }
}
