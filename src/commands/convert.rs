//! # convert 命令实现
//!
//! 批量转换音频文件：校验配置、发现文件、规划作业、并行调用 ffmpeg、汇总报告。
//!
//! ## 功能
//! - 校验输入目录，处理已存在的输出目录
//! - 按扩展名收集文件并镜像到输出目录
//! - 并行处理，进度条与逐文件错误输出
//! - 可选 dry-run、fail-fast、CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `batch/`, `encoder/`, `models/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/prompt.rs`, `utils/report.rs`
//! - `discover` / `dispatch` 也被 `commands/interactive.rs` 复用

use crate::batch::{BatchSummary, CancelToken, Dispatcher, FileCollector};
use crate::cli::{Cli, USAGE_HINT};
use crate::encoder::{Encoder, DEFAULT_PROGRAM};
use crate::error::{AudioconvError, Result};
use crate::models::{ConversionJob, ConversionResult, Plan, Settings};
use crate::utils::prompt::{self, Prompter};
use crate::utils::{output, progress, report};

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// 运行控制选项
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub ffmpeg: Option<PathBuf>,
    pub assume_yes: bool,
    pub dry_run: bool,
    pub fail_fast: bool,
    pub report: Option<PathBuf>,
    pub verbose: bool,
    /// 逐文件输出 `✓ Converted` / `✗ Error` 日志
    pub log_each: bool,
    /// 前端持有的取消信号
    pub cancel: CancelToken,
}

impl RunOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        RunOptions {
            ffmpeg: cli.ffmpeg.clone(),
            assume_yes: cli.yes,
            dry_run: cli.dry_run,
            fail_fast: cli.fail_fast,
            report: cli.report.clone(),
            verbose: cli.verbose,
            log_each: false,
            cancel: CancelToken::new(),
        }
    }
}

/// 执行命令行模式
pub fn execute(cli: Cli) -> Result<()> {
    let settings = settings_from_cli(&cli)?;
    let options = RunOptions::from_cli(&cli);

    output::print_header(&format!(
        "Converting to {} ({} Hz, {}-bit)",
        settings.output_format, settings.sample_rate, settings.bit_depth
    ));

    FileCollector::new(&settings.input_root).validate()?;
    let encoder = locate_encoder(&options)?;
    output::print_info(&format!("Using encoder {}", encoder.program().display()));
    prepare_output_dir(
        &settings.output_root,
        options.assume_yes,
        options.dry_run,
        &mut prompt::stdio(),
    )?;

    let plan = discover(&settings)?;
    if plan.jobs.is_empty() && plan.rejected.is_empty() {
        output::print_warning("No audio files found.");
        return Ok(());
    }

    dispatch(&settings, plan, &encoder, &options)?;
    Ok(())
}

/// 从命令行参数构造设置；缺少位置参数时报错
pub fn settings_from_cli(cli: &Cli) -> Result<Settings> {
    let missing = cli.missing_positionals();
    if !missing.is_empty() {
        return Err(AudioconvError::MissingArguments {
            missing: missing.join(", "),
            usage: USAGE_HINT.to_string(),
        });
    }

    match (
        &cli.input_dir,
        &cli.output_dir,
        &cli.exts,
        &cli.format,
        cli.rate,
        cli.bit_depth,
    ) {
        (Some(input), Some(output), Some(exts), Some(format), Some(rate), Some(depth)) => {
            Ok(Settings {
                input_root: input.clone(),
                output_root: output.clone(),
                extension_filter: exts.clone(),
                output_format: format.clone(),
                sample_rate: rate,
                bit_depth: depth,
                workers: Dispatcher::new(cli.workers).workers(),
            })
        }
        _ => Err(AudioconvError::InvalidArgument(USAGE_HINT.to_string())),
    }
}

/// 定位编码器；dry-run 时找不到也用默认名显示命令
pub fn locate_encoder(options: &RunOptions) -> Result<Encoder> {
    match Encoder::locate(options.ffmpeg.as_deref()) {
        Ok(encoder) => Ok(encoder),
        Err(_) if options.dry_run => Ok(Encoder::new(
            options
                .ffmpeg
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
        )),
        Err(e) => Err(e),
    }
}

/// 准备输出目录
///
/// - 不存在：创建
/// - 存在且为空：继续
/// - 存在且非空：警告并确认，拒绝则中止；无人值守时不提问，直接中止
pub fn prepare_output_dir<R: BufRead, W: Write>(
    dir: &Path,
    assume_yes: bool,
    dry_run: bool,
    prompter: &mut Prompter<R, W>,
) -> Result<()> {
    if !dir.exists() {
        if dry_run {
            output::print_info(&format!("Would create output directory {}", dir.display()));
            return Ok(());
        }
        fs::create_dir_all(dir).map_err(|e| AudioconvError::CreateDirError {
            path: dir.display().to_string(),
            source: e,
        })?;
        output::print_info(&format!("Created output directory {}", dir.display()));
        return Ok(());
    }

    if !dir.is_dir() {
        return Err(AudioconvError::InvalidArgument(format!(
            "Output path {} is not a directory",
            dir.display()
        )));
    }

    let is_empty = fs::read_dir(dir)
        .map_err(|e| AudioconvError::DirectoryReadError {
            path: dir.display().to_string(),
            source: e,
        })?
        .next()
        .is_none();

    if is_empty {
        output::print_info(&format!(
            "Output directory {} already exists but is empty. Continuing...",
            dir.display()
        ));
        return Ok(());
    }

    output::print_warning(&format!(
        "Output directory {} already exists and is not empty.",
        dir.display()
    ));
    if assume_yes || dry_run {
        return Ok(());
    }
    if !prompter.is_attended() {
        output::print_warning("Not running in a terminal; pass --yes to write into it anyway.");
        return Err(AudioconvError::Aborted {
            path: dir.display().to_string(),
        });
    }
    if prompter.confirm("Continue anyway? Files may be overwritten.", false)? {
        Ok(())
    } else {
        Err(AudioconvError::Aborted {
            path: dir.display().to_string(),
        })
    }
}

/// 发现文件并规划作业
pub fn discover(settings: &Settings) -> Result<Plan> {
    let files = FileCollector::new(&settings.input_root)
        .with_filter(settings.extension_filter.clone())
        .collect()?;

    let plan = settings.plan(&files);
    if !files.is_empty() {
        output::print_info(&format!(
            "Found {} file(s) matching '{}' under {}",
            files.len(),
            settings.extension_filter,
            settings.input_root.display()
        ));
    }
    Ok(plan)
}

/// 并行执行作业并汇总
pub fn dispatch(
    settings: &Settings,
    plan: Plan,
    encoder: &Encoder,
    options: &RunOptions,
) -> Result<BatchSummary> {
    let Plan { jobs, rejected } = plan;

    for r in &rejected {
        log_result(r, options.log_each);
    }

    if options.dry_run {
        for job in &jobs {
            output::print_command(&encoder.command_line(job));
        }
        output::print_done(&format!(
            "Dry run: {} command(s) not executed",
            jobs.len()
        ));
        let mut summary = BatchSummary {
            not_started: jobs.len(),
            ..BatchSummary::default()
        };
        for r in &rejected {
            summary.record(r);
        }
        return Ok(summary);
    }

    let dispatcher = Dispatcher::new(settings.workers).with_cancel(options.cancel.clone());
    let pb = progress::create_progress_bar(jobs.len() as u64, "Converting");

    let worker_encoder = encoder.clone();
    let worker_cancel = dispatcher.cancel_token();
    let worker_pb = pb.clone();
    let verbose = options.verbose;
    let processor = move |job: &ConversionJob| {
        if verbose {
            worker_pb.suspend(|| output::print_command(&worker_encoder.command_line(job)));
        }
        worker_encoder.invoke(job, &worker_cancel)
    };

    let mut handle = dispatcher.spawn(jobs, processor)?;
    pb.suspend(|| {
        output::print_info(&format!(
            "Processing {} files using {} workers...",
            handle.total(),
            dispatcher.workers()
        ))
    });
    let mut results: Vec<ConversionResult> = rejected.clone();
    let mut stopped = false;

    while let Some(result) = handle.next_result() {
        pb.suspend(|| log_result(&result, options.log_each));
        if !result.succeeded && options.fail_fast && !stopped {
            stopped = true;
            handle.cancel();
            pb.suspend(|| output::print_warning("Stopping after first failure (--fail-fast)"));
        }
        pb.set_message(format!("Converting {}%", handle.progress().percent()));
        pb.inc(1);
        results.push(result);
    }

    let mut summary = handle.wait();
    pb.finish_and_clear();

    for r in &rejected {
        summary.record(r);
    }

    print_summary(&summary);

    if let Some(path) = &options.report {
        report::write_csv(&results, path)?;
        output::print_success(&format!("Report saved to '{}'", path.display()));
    }

    output::print_done("Done.");
    Ok(summary)
}

/// 输出单个结果：命令行模式只报错误，交互模式逐文件记录
fn log_result(result: &ConversionResult, log_each: bool) {
    let source = result.source_path.display().to_string();
    match (result.succeeded, log_each) {
        (true, true) => output::print_converted(&display_name(&result.source_path)),
        (true, false) => {}
        (false, true) => output::print_file_failed(&source, result.detail()),
        (false, false) => output::print_file_error(&source, result.detail()),
    }
}

fn print_summary(summary: &BatchSummary) {
    let mut line = format!(
        "Converted {} of {} file(s)",
        summary.succeeded,
        summary.completed() + summary.not_started
    );
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.not_started > 0 {
        line.push_str(&format!(", {} not started", summary.not_started));
    }

    if summary.failed == 0 {
        output::print_success(&line);
    } else {
        output::print_warning(&line);
        println!("{}", report::failure_table(&summary.failures));
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtensionFilter;
    use std::io::Cursor;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"RIFF").unwrap();
    }

    fn settings(root: &Path, exts: &str, format: &str) -> Settings {
        Settings {
            input_root: root.join("in"),
            output_root: root.join("out"),
            extension_filter: exts.parse::<ExtensionFilter>().unwrap(),
            output_format: format.parse().unwrap(),
            sample_rate: 48000,
            bit_depth: 24,
            workers: 2,
        }
    }

    fn no_input() -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[test]
    fn test_settings_from_cli_requires_all_positionals() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["audioconv", "in", "out", "*"]).unwrap();
        let err = settings_from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("FORMAT, RATE, BIT_DEPTH"));

        let cli =
            Cli::try_parse_from(["audioconv", "in", "out", "*", "mp3", "44100", "16", "-w", "0"])
                .unwrap();
        let s = settings_from_cli(&cli).unwrap();
        assert_eq!(s.extension_filter, ExtensionFilter::All);
        assert!(s.workers >= 1);
    }

    #[test]
    fn test_prepare_output_dir_cases() {
        let dir = tempfile::tempdir().unwrap();

        let fresh = dir.path().join("fresh/nested");
        prepare_output_dir(&fresh, false, false, &mut no_input()).unwrap();
        assert!(fresh.is_dir());

        // 空目录直接继续
        prepare_output_dir(&fresh, false, false, &mut no_input()).unwrap();

        touch(&fresh, "old.flac");
        let declined = prepare_output_dir(&fresh, false, false, &mut no_input());
        assert!(matches!(declined, Err(AudioconvError::Aborted { .. })));

        let mut says_yes = Prompter::new(Cursor::new(b"y\n".to_vec()), Vec::new());
        prepare_output_dir(&fresh, false, false, &mut says_yes).unwrap();
        prepare_output_dir(&fresh, true, false, &mut no_input()).unwrap();

        // 管道输入的 "y" 不算确认，只有 --yes 能跳过
        let mut piped_yes =
            Prompter::new(Cursor::new(b"y\n".to_vec()), Vec::new()).with_attended(false);
        let unattended = prepare_output_dir(&fresh, false, false, &mut piped_yes);
        assert!(matches!(unattended, Err(AudioconvError::Aborted { .. })));
        prepare_output_dir(&fresh, true, false, &mut no_input().with_attended(false)).unwrap();

        touch(dir.path(), "plain.txt");
        let not_dir = prepare_output_dir(&dir.path().join("plain.txt"), true, false, &mut no_input());
        assert!(matches!(not_dir, Err(AudioconvError::InvalidArgument(_))));
    }

    #[test]
    fn test_discover_mirrors_filtered_tree() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "in/a/x.wav");
        touch(dir.path(), "in/a/y.flac");
        touch(dir.path(), "in/b/z.txt");

        let s = settings(dir.path(), "wav|flac", "flac");
        let plan = discover(&s).unwrap();
        let targets: Vec<PathBuf> = plan.jobs.iter().map(|j| j.target_path.clone()).collect();
        assert_eq!(
            targets,
            vec![
                dir.path().join("out/a/x.flac"),
                dir.path().join("out/a/y.flac")
            ]
        );
        assert!(plan.rejected.is_empty());

        let missing = discover(&settings(&dir.path().join("nowhere"), "*", "wav"));
        assert!(matches!(missing, Err(AudioconvError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_dry_run_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "in/x.wav");
        touch(dir.path(), "in/y.wav");

        let s = settings(dir.path(), "wav", "mp3");
        let plan = discover(&s).unwrap();
        let options = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let summary = dispatch(&s, plan, &Encoder::new("ffmpeg"), &options).unwrap();
        assert_eq!(summary.not_started, 2);
        assert_eq!(summary.completed(), 0);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_cancelled_before_dispatch_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "in/x.wav");
        touch(dir.path(), "in/y.wav");
        touch(dir.path(), "in/z.wav");

        let s = settings(dir.path(), "wav", "flac");
        let plan = discover(&s).unwrap();
        let options = RunOptions {
            log_each: true,
            ..RunOptions::default()
        };
        options.cancel.cancel();

        let summary = dispatch(&s, plan, &Encoder::new("ffmpeg"), &options).unwrap();
        assert_eq!(summary.completed(), 0);
        assert_eq!(summary.not_started, 3);
        assert!(!dir.path().join("out").exists());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// 把收到的参数写进目标文件的假编码器；源文件为 bad.wav 时失败
        fn fake_encoder(dir: &Path) -> Encoder {
            let path = dir.join("fake-ffmpeg");
            let body = "#!/bin/sh\n\
                case \"$5\" in */bad.wav) echo \"corrupt input: $5\" >&2; exit 1;; esac\n\
                for last; do :; done\n\
                printf '%s\\n' \"$@\" > \"$last\"\n";
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            Encoder::new(path)
        }

        #[test]
        fn test_end_to_end_flac_24bit() {
            let dir = tempfile::tempdir().unwrap();
            touch(dir.path(), "in/a/x.wav");
            touch(dir.path(), "in/a/y.flac");
            touch(dir.path(), "in/b/z.txt");

            let s = settings(dir.path(), "wav|flac", "flac");
            let plan = discover(&s).unwrap();
            assert_eq!(plan.jobs.len(), 2);

            let report_path = dir.path().join("report.csv");
            let options = RunOptions {
                report: Some(report_path.clone()),
                ..RunOptions::default()
            };
            let summary = dispatch(&s, plan, &fake_encoder(dir.path()), &options).unwrap();
            assert_eq!(summary.succeeded, 2);
            assert_eq!(summary.failed, 0);

            for name in ["a/x.flac", "a/y.flac"] {
                let args = fs::read_to_string(dir.path().join("out").join(name)).unwrap();
                assert!(args.contains("-ar\n48000\n"));
                assert!(args.contains("-sample_fmt\ns32\n-bits_per_raw_sample\n24\n"));
                assert!(args.contains("-f\nflac\n"));
            }
            assert!(!dir.path().join("out/b").exists());
            assert!(report_path.is_file());
        }

        #[test]
        fn test_failed_file_does_not_abort_batch() {
            let dir = tempfile::tempdir().unwrap();
            touch(dir.path(), "in/good1.wav");
            touch(dir.path(), "in/bad.wav");
            touch(dir.path(), "in/good2.wav");

            let s = settings(dir.path(), "wav", "mp3");
            let plan = discover(&s).unwrap();
            let summary =
                dispatch(&s, plan, &fake_encoder(dir.path()), &RunOptions::default()).unwrap();

            assert_eq!(summary.succeeded, 2);
            assert_eq!(summary.failed, 1);
            assert!(summary.failures[0].detail().contains("corrupt input"));

            let args = fs::read_to_string(dir.path().join("out/good1.mp3")).unwrap();
            assert!(args.contains("-b:a\n192k\n"));
        }

        #[test]
        fn test_fail_fast_stops_remaining_jobs() {
            let dir = tempfile::tempdir().unwrap();
            touch(dir.path(), "in/bad.wav");
            for i in 0..6 {
                touch(dir.path(), &format!("in/good{}.wav", i));
            }

            let mut s = settings(dir.path(), "wav", "flac");
            s.workers = 1;
            let plan = discover(&s).unwrap();
            let options = RunOptions {
                fail_fast: true,
                ..RunOptions::default()
            };
            let summary = dispatch(&s, plan, &fake_encoder(dir.path()), &options).unwrap();

            assert!(summary.failed >= 1);
            assert!(summary.not_started >= 1);
            assert_eq!(summary.completed() + summary.not_started, 7);
        }
    }
}
