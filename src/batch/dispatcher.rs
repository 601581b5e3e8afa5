//! # 批量调度器
//!
//! 在固定大小的工作线程池上并行执行转换作业，并通过通道按完成顺序交付结果。
//!
//! ## 功能
//! - 基于 rayon 线程池，最多 `workers` 个作业同时执行
//! - 每个作业恰好交付一个结果；单个作业 panic 被转换为失败结果
//! - 取消：停止启动新作业，已交付的结果保持有效
//! - 与展示层无关：命令行和交互模式都通过 `BatchHandle` 订阅结果与进度
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `models/job.rs` 的作业与结果类型
//! - 使用 `rayon` 进行并行处理

use crate::error::{AudioconvError, Result};
use crate::models::{ConversionJob, ConversionResult};

use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// 取消信号（可克隆，所有克隆共享同一状态）
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出取消信号
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 聚合进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// 完成百分比 (0-100)
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 成功数量
    pub succeeded: usize,
    /// 失败数量
    pub failed: usize,
    /// 因取消而未启动的数量
    pub not_started: usize,
    /// 失败详情
    pub failures: Vec<ConversionResult>,
}

impl BatchSummary {
    /// 合并单个结果
    pub fn record(&mut self, result: &ConversionResult) {
        if result.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            self.failures.push(result.clone());
        }
    }

    /// 已交付结果的数量
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// 批量调度器
pub struct Dispatcher {
    /// 并行作业数
    workers: usize,
    cancel: CancelToken,
}

impl Dispatcher {
    /// 创建新的调度器（`workers == 0` 表示使用全部 CPU）
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 { num_cpus::get() } else { workers };
        Self {
            workers,
            cancel: CancelToken::new(),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 使用外部提供的取消信号（例如交互模式中用户的取消输入）
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 获取本调度器的取消信号，可交给处理函数或前端
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// 在后台启动批处理，立即返回句柄
    pub fn spawn<F>(&self, jobs: Vec<ConversionJob>, processor: F) -> Result<BatchHandle>
    where
        F: Fn(&ConversionJob) -> ConversionResult + Send + Sync + 'static,
    {
        let total = jobs.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("audioconv-worker-{}", i))
            .build()
            .map_err(|e| AudioconvError::ThreadPool(e.to_string()))?;

        let (tx, rx) = mpsc::channel();
        let cancel = self.cancel.clone();

        let driver = thread::Builder::new()
            .name("audioconv-dispatch".to_string())
            .spawn(move || {
                pool.install(|| {
                    jobs.into_par_iter().for_each_with(tx, |tx, job| {
                        if cancel.is_cancelled() {
                            return;
                        }
                        let result = run_guarded(&processor, &job);
                        // 接收端已丢弃说明前端放弃了剩余结果
                        let _ = tx.send(result);
                    });
                });
            })
            .map_err(|e| AudioconvError::ThreadPool(e.to_string()))?;

        Ok(BatchHandle {
            total,
            results: rx,
            cancel: self.cancel.clone(),
            driver: Some(driver),
            summary: BatchSummary::default(),
        })
    }
}

/// 运行中批处理的句柄
pub struct BatchHandle {
    total: usize,
    results: Receiver<ConversionResult>,
    cancel: CancelToken,
    driver: Option<JoinHandle<()>>,
    summary: BatchSummary,
}

impl BatchHandle {
    /// 提交的作业总数
    pub fn total(&self) -> usize {
        self.total
    }

    /// 当前进度
    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.summary.completed(),
            total: self.total,
        }
    }

    /// 取消剩余作业
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 阻塞等待下一个完成的结果；全部结束后返回 `None`
    pub fn next_result(&mut self) -> Option<ConversionResult> {
        let result = self.results.recv().ok()?;
        self.summary.record(&result);
        Some(result)
    }

    /// 取完剩余结果并返回统计
    pub fn wait(mut self) -> BatchSummary {
        while self.next_result().is_some() {}
        if let Some(driver) = self.driver.take() {
            // 作业 panic 已在 run_guarded 中捕获，这里只剩线程池本身的异常
            let _ = driver.join();
        }
        let mut summary = std::mem::take(&mut self.summary);
        summary.not_started = self.total.saturating_sub(summary.completed());
        summary
    }
}

impl Iterator for BatchHandle {
    type Item = ConversionResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result()
    }
}

/// 执行单个作业，把 panic 转换为失败结果
fn run_guarded<F>(processor: &F, job: &ConversionJob) -> ConversionResult
where
    F: Fn(&ConversionJob) -> ConversionResult,
{
    match panic::catch_unwind(AssertUnwindSafe(|| processor(job))) {
        Ok(result) => result,
        Err(payload) => ConversionResult::failure(
            job,
            format!("internal error: {}", panic_message(payload.as_ref())),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
