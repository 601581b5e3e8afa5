//! # 外部进程执行
//!
//! 同步运行编码器子进程，收集 stderr，并在取消时终止子进程。
//!
//! ## 依赖关系
//! - 被 `encoder/mod.rs` 使用
//! - 使用 `batch/dispatcher.rs` 的 `CancelToken`

use crate::batch::CancelToken;

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

/// 子进程轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// 子进程运行结果
#[derive(Debug)]
pub enum ProcessOutcome {
    /// 退出码为 0
    Succeeded,
    /// 非零退出
    Failed { status: ExitStatus, stderr: String },
    /// 被取消信号终止
    Cancelled,
}

/// 运行命令直至结束或被取消
pub fn run(mut command: Command, cancel: &CancelToken) -> io::Result<ProcessOutcome> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = command.spawn()?;

    // 单独线程读取 stderr，避免管道写满阻塞子进程
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(e) => {
                reap(&mut child);
                return Err(e);
            }
        }

        if cancel.is_cancelled() {
            reap(&mut child);
            return Ok(ProcessOutcome::Cancelled);
        }

        thread::sleep(POLL_INTERVAL);
    };

    if status.success() {
        return Ok(ProcessOutcome::Succeeded);
    }

    let stderr = stderr_reader
        .and_then(|reader| reader.join().ok())
        .unwrap_or_default();
    Ok(ProcessOutcome::Failed { status, stderr })
}

/// 终止子进程并回收，避免留下僵尸进程
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_reap_collects_killed_child() {
        let mut child = Command::new("sleep").arg("10").spawn().unwrap();
        reap(&mut child);
        // 已回收的子进程再次查询时立即给出退出状态
        let status = child.try_wait().unwrap();
        assert!(matches!(status, Some(s) if !s.success()));
    }

    #[test]
    fn test_pre_cancelled_run_kills_child() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut cmd = Command::new("sleep");
        cmd.arg("10");
        assert!(matches!(run(cmd, &cancel).unwrap(), ProcessOutcome::Cancelled));
    }
}
