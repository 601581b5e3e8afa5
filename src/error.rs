//! # 统一错误处理模块
//!
//! 定义 audioconv 的配置类错误，使用 `thiserror` 派生。
//! 单个文件的转换失败不走这里，而是记录在 `ConversionResult` 中。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// audioconv 统一错误类型
#[derive(Error, Debug)]
pub enum AudioconvError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read directory: {path}")]
    DirectoryReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input directory {path} does not exist")]
    DirectoryNotFound { path: String },

    #[error("Input path {path} is not a directory")]
    NotADirectory { path: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH (use --ffmpeg or AUDIOCONV_FFMPEG)")]
    CommandNotFound { command: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Missing required arguments for CLI mode: {missing}\n{usage}")]
    MissingArguments { missing: String, usage: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid extension filter '{0}': expected '*' or a list like 'wav|mp3|flac'")]
    InvalidExtensionFilter(String),

    #[error("Invalid output format '{0}'")]
    InvalidFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 运行控制
    // ─────────────────────────────────────────────────────────────
    #[error("Aborted: output directory {path} is not empty")]
    Aborted { path: String },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, AudioconvError>;
