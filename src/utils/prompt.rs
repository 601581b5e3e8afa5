//! # 终端问答工具
//!
//! 从输入流读取回答，提问文本写到 stderr，保持 stdout 干净。
//! 输入流可替换，便于测试。stdin 或 stderr 不是终端时视为无人值守。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/interactive.rs` 使用
//! - 使用 `console` 的 `Term` 作为输出端并检测终端

use colored::Colorize;
use std::io::{self, BufRead, IsTerminal, StdinLock, Write};

/// 问答器
pub struct Prompter<R, W> {
    input: R,
    output: W,
    /// 有人在终端前回答问题
    attended: bool,
}

/// 基于标准输入和 stderr 终端的问答器
pub fn stdio() -> Prompter<StdinLock<'static>, console::Term> {
    let stdin = io::stdin();
    // console 只检测输出端，stdin 是否为终端由标准库判断
    let attended = stdin.is_terminal() && console::user_attended_stderr();
    Prompter::new(stdin.lock(), console::Term::stderr()).with_attended(attended)
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            attended: true,
        }
    }

    pub fn with_attended(mut self, attended: bool) -> Self {
        self.attended = attended;
        self
    }

    pub fn is_attended(&self) -> bool {
        self.attended
    }

    /// 读取一行；输入结束时返回 `None`
    fn read_answer(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// 提问，空回答取默认值
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String> {
        match default {
            Some(d) => write!(self.output, "{} [{}]: ", question.bold(), d)?,
            None => write!(self.output, "{}: ", question.bold())?,
        }
        self.output.flush()?;

        match (self.read_answer()?, default) {
            (Some(answer), Some(d)) if answer.is_empty() => Ok(d.to_string()),
            (Some(answer), _) => Ok(answer),
            (None, Some(d)) => Ok(d.to_string()),
            (None, None) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            )),
        }
    }

    /// 反复提问直到回答能被解析
    pub fn ask_parsed<T, F>(&mut self, question: &str, default: Option<&str>, parse: F) -> io::Result<T>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            let answer = self.ask(question, default)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(reason) => writeln!(self.output, "  {} {}", "!".yellow().bold(), reason)?,
            }
        }
    }

    /// 是/否确认；输入结束视为否
    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        write!(self.output, "{} ({}): ", question.bold(), hint)?;
        self.output.flush()?;

        loop {
            let Some(answer) = self.read_answer()? else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {
                    write!(self.output, "Please answer y or n ({}): ", hint)?;
                    self.output.flush()?;
                }
            }
        }
    }

    /// 从编号列表中选择，可输入序号或选项文本；返回下标
    pub fn choose(&mut self, title: &str, options: &[&str], default: usize) -> io::Result<usize> {
        writeln!(self.output, "{}", title.bold())?;
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default { "*" } else { " " };
            writeln!(self.output, " {} {}) {}", marker, i + 1, option)?;
        }

        let default_label = (default + 1).to_string();
        self.ask_parsed("Choice", Some(&default_label), |answer| {
            if let Ok(n) = answer.parse::<usize>() {
                if (1..=options.len()).contains(&n) {
                    return Ok(n - 1);
                }
            }
            options
                .iter()
                .position(|o| o.eq_ignore_ascii_case(answer))
                .ok_or_else(|| format!("Pick a number between 1 and {}", options.len()))
        })
    }
}
