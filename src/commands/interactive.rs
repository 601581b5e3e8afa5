//! # 交互模式
//!
//! 在终端中逐项询问转换设置，然后复用命令行模式的发现与调度流程。
//! 选项与默认值与图形界面一致：格式、采样率、位深列表，以及 CPU 核数上限。
//! 转换过程中输入 `q` 回车即可取消，相当于图形界面的 Cancel 按钮。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `commands/convert.rs` 的 `discover` / `dispatch`
//! - 使用 `utils/prompt.rs`

use super::convert::{self, RunOptions};
use crate::batch::CancelToken;
use crate::cli::Cli;
use crate::error::Result;
use crate::models::{ExtensionFilter, OutputFormat, Settings, COMMON_AUDIO_EXTENSIONS};
use crate::utils::output;
use crate::utils::prompt::{self, Prompter};

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

pub const FORMATS: [&str; 6] = ["wav", "flac", "mp3", "aiff", "ogg", "m4a"];
pub const SAMPLE_RATES: [&str; 4] = ["44100", "48000", "96000", "192000"];
pub const BIT_DEPTHS: [&str; 3] = ["16", "24", "32"];

/// 执行交互模式
pub fn execute(cli: &Cli) -> Result<()> {
    output::print_header("Multicore Audio Batch Converter");

    let mut prompter = prompt::stdio();
    let options = RunOptions {
        ffmpeg: cli.ffmpeg.clone(),
        verbose: cli.verbose,
        log_each: true,
        ..RunOptions::default()
    };
    let encoder = convert::locate_encoder(&options)?;

    let settings = ask_settings(&mut prompter, num_cpus::get())?;
    convert::prepare_output_dir(&settings.output_root, false, false, &mut prompter)?;

    let plan = convert::discover(&settings)?;
    if plan.jobs.is_empty() {
        output::print_warning("No matching audio files were found in the selected directory.");
        return Ok(());
    }

    let question = format!("Start conversion of {} file(s)?", plan.jobs.len());
    if !prompter.confirm(&question, true)? {
        output::print_warning("Conversion canceled by user");
        return Ok(());
    }

    // 释放 stdin 锁，交给取消监听线程；批处理结束后该线程随进程退出
    drop(prompter);
    output::print_info("Type q and press Enter to cancel.");
    listen_for_cancel(BufReader::new(io::stdin()), options.cancel.clone());

    convert::dispatch(&settings, plan, &encoder, &options)?;
    if options.cancel.is_cancelled() {
        output::print_warning("Conversion canceled by user");
    } else {
        output::print_success("Audio conversion has been completed.");
    }
    Ok(())
}

/// 在后台逐行读取输入，读到 `q` / `quit` / `cancel` 时发出取消信号
pub fn listen_for_cancel<R>(input: R, cancel: CancelToken) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if matches!(
                line.trim().to_ascii_lowercase().as_str(),
                "q" | "quit" | "cancel"
            ) {
                cancel.cancel();
                break;
            }
        }
    })
}

/// 逐项询问设置
pub fn ask_settings<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    max_workers: usize,
) -> Result<Settings> {
    let max_workers = max_workers.max(1);

    let input_root = prompter.ask_parsed("Input directory", None, |answer| {
        let path = PathBuf::from(answer);
        if !answer.is_empty() && path.is_dir() {
            Ok(path)
        } else {
            Err(format!("'{}' is not an existing directory", answer))
        }
    })?;

    let output_root = prompter.ask_parsed("Output directory", None, |answer| {
        if answer.is_empty() {
            Err("Please enter a directory".to_string())
        } else {
            Ok(PathBuf::from(answer))
        }
    })?;

    let common = format!("Common audio ({})", COMMON_AUDIO_EXTENSIONS);
    let extension_filter = match prompter.choose(
        "File extensions to process",
        &["All files (*)", common.as_str(), "Custom..."],
        0,
    )? {
        0 => ExtensionFilter::All,
        1 => COMMON_AUDIO_EXTENSIONS.parse::<ExtensionFilter>()?,
        _ => prompter.ask_parsed("Custom extensions (e.g. wav|mp3|flac)", None, |answer| {
            answer.parse::<ExtensionFilter>().map_err(|e| e.to_string())
        })?,
    };

    let output_format =
        FORMATS[prompter.choose("Output format", &FORMATS, 0)?].parse::<OutputFormat>()?;
    let sample_rate = SAMPLE_RATES[prompter.choose("Sample rate", &SAMPLE_RATES, 0)?]
        .parse::<u32>()
        .unwrap_or(44100);
    let bit_depth = BIT_DEPTHS[prompter.choose("Bit depth", &BIT_DEPTHS, 0)?]
        .parse::<u32>()
        .unwrap_or(16);

    let default_workers = max_workers.to_string();
    let workers = prompter.ask_parsed("CPU cores to use", Some(&default_workers), |answer| {
        match answer.parse::<usize>() {
            Ok(n) if (1..=max_workers).contains(&n) => Ok(n),
            _ => Err(format!("Enter a number between 1 and {}", max_workers)),
        }
    })?;

    Ok(Settings {
        input_root,
        output_root,
        extension_filter,
        output_format,
        sample_rate,
        bit_depth,
        workers,
    })
}
