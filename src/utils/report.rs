//! # 转换报告
//!
//! 失败文件汇总表与逐文件 CSV 报告。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `tabled` 渲染终端表格
//! - 使用 `csv` + `serde` 写入报告

use crate::error::{AudioconvError, Result};
use crate::models::ConversionResult;

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// 失败汇总表的一行
#[derive(Debug, Clone, Tabled)]
struct FailureRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// CSV 报告的一行
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    source: String,
    target: String,
    status: &'a str,
    detail: &'a str,
}

/// 渲染失败文件表格（每个原因只取首行）
pub fn failure_table(failures: &[ConversionResult]) -> String {
    let rows: Vec<FailureRow> = failures
        .iter()
        .enumerate()
        .map(|(i, r)| FailureRow {
            index: i + 1,
            file: r.source_path.display().to_string(),
            reason: r.detail().lines().next().unwrap_or("").to_string(),
        })
        .collect();
    Table::new(&rows).to_string()
}

/// 写入逐文件 CSV 报告
pub fn write_csv(results: &[ConversionResult], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for r in results {
        wtr.serialize(ReportRow {
            source: r.source_path.display().to_string(),
            target: r.target_path.display().to_string(),
            status: if r.succeeded { "ok" } else { "failed" },
            detail: r.detail(),
        })?;
    }

    wtr.flush().map_err(|e| AudioconvError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
