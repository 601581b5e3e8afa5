//! # 终端输出
//!
//! 面向用户的每一行都从这里输出：带颜色标签的状态行、逐文件日志和标题栏。
//! 状态行写 stdout，配置错误与命令行模式下的文件错误写 stderr。
//!
//! ## 依赖关系
//! - 被 `main.rs` 和所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::{ColoredString, Colorize};

/// 状态行前缀
#[derive(Clone, Copy)]
enum Tag {
    Ok,
    Err,
    Warn,
    Info,
    Done,
    Cmd,
}

impl Tag {
    fn label(self) -> ColoredString {
        match self {
            Tag::Ok => "[OK]".green().bold(),
            Tag::Err => "[ERR]".red().bold(),
            Tag::Warn => "[WARN]".yellow().bold(),
            Tag::Info => "[*]".blue().bold(),
            Tag::Done => "[DONE]".green().bold(),
            Tag::Cmd => "[$]".dimmed(),
        }
    }
}

fn tagged(tag: Tag, msg: &str) -> String {
    format!("{} {}", tag.label(), msg)
}

/// `<file>: <detail>`，去掉 detail 末尾的换行
fn file_detail(file: &str, detail: &str) -> String {
    format!("{}: {}", file, detail.trim_end())
}

pub fn print_success(msg: &str) {
    println!("{}", tagged(Tag::Ok, msg));
}

pub fn print_error(msg: &str) {
    eprintln!("{}", tagged(Tag::Err, msg));
}

pub fn print_warning(msg: &str) {
    println!("{}", tagged(Tag::Warn, msg));
}

pub fn print_info(msg: &str) {
    println!("{}", tagged(Tag::Info, msg));
}

pub fn print_done(msg: &str) {
    println!("{}", tagged(Tag::Done, msg));
}

/// 将要执行的命令（dry-run / verbose）
pub fn print_command(cmd: &str) {
    println!("{}", tagged(Tag::Cmd, &cmd.dimmed().to_string()));
}

/// 命令行模式：单个文件转换失败
pub fn print_file_error(file: &str, detail: &str) {
    eprintln!("{}", tagged(Tag::Err, &file_detail(file, detail)));
}

/// 交互模式日志：`✓ Converted: <file name>`
pub fn print_converted(name: &str) {
    println!("{} Converted: {}", "✓".green().bold(), name);
}

/// 交互模式日志：`✗ Error: <file>: <detail>`
pub fn print_file_failed(file: &str, detail: &str) {
    println!("{} Error: {}", "✗".red().bold(), file_detail(file, detail));
}

/// 标题栏
pub fn print_header(title: &str) {
    let rule = "═".repeat(56);
    println!("\n{}\n {}\n{}\n", rule.dimmed(), title.bold(), rule.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_detail_trims_trailing_newlines() {
        assert_eq!(
            file_detail("in/x.wav", "ffmpeg failed (exit status: 1)\ncorrupt\n"),
            "in/x.wav: ffmpeg failed (exit status: 1)\ncorrupt"
        );
    }
}
