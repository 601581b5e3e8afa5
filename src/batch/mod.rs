//! # 批量处理模块
//!
//! 提供文件发现与并行调度能力。
//!
//! ## 功能
//! - 递归收集匹配扩展名的文件
//! - 固定大小线程池并行执行
//! - 通过通道交付结果，支持取消
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `encoder/` 使用
//! - 使用 `rayon` 进行并行处理

pub mod collector;
pub mod dispatcher;

pub use collector::FileCollector;
pub use dispatcher::{BatchSummary, CancelToken, Dispatcher};
