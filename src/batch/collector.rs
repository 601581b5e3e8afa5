//! # 文件收集器
//!
//! 递归收集输入目录下所有通过扩展名过滤的普通文件。
//!
//! ## 功能
//! - 递归目录搜索
//! - 大小写不敏感的扩展名过滤
//! - 按路径排序的稳定输出
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/interactive.rs` 调用
//! - 使用 `walkdir` 遍历目录

use crate::error::{AudioconvError, Result};
use crate::models::ExtensionFilter;

use std::path::PathBuf;
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入根目录
    root: PathBuf,
    /// 扩展名过滤器
    filter: ExtensionFilter,
}

impl FileCollector {
    /// 创建新的文件收集器（默认匹配所有文件）
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: ExtensionFilter::All,
        }
    }

    /// 设置扩展名过滤器
    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// 检查输入根目录是否存在且为目录
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(AudioconvError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }
        if !self.root.is_dir() {
            return Err(AudioconvError::NotADirectory {
                path: self.root.display().to_string(),
            });
        }
        Ok(())
    }

    /// 收集所有匹配的文件
    ///
    /// 无匹配时返回空列表；无法读取的条目被跳过。
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        self.validate()?;

        let files = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.filter.matches(e.path()))
            .map(|e| e.into_path())
            .collect();

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a/x.wav");
        touch(dir.path(), "a/y.FLAC");
        touch(dir.path(), "b/z.txt");
        touch(dir.path(), "b/deep/w.wav");
        touch(dir.path(), "README");

        let files = FileCollector::new(dir.path())
            .with_filter("wav|flac".parse().unwrap())
            .collect()
            .unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec!["a/x.wav", "a/y.FLAC", "b/deep/w.wav"]
        );

        let all = FileCollector::new(dir.path()).collect().unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_collect_empty_match_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files = FileCollector::new(dir.path())
            .with_filter("mp3".parse().unwrap())
            .collect()
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_collect_rejects_missing_or_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileCollector::new(dir.path().join("nope")).collect();
        assert!(matches!(missing, Err(AudioconvError::DirectoryNotFound { .. })));

        touch(dir.path(), "file.wav");
        let not_dir = FileCollector::new(dir.path().join("file.wav")).collect();
        assert!(matches!(not_dir, Err(AudioconvError::NotADirectory { .. })));
    }
}
