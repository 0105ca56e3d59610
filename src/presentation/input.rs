/// プレゼンテーション層: ユーザー入力処理
///
/// 対話シェルの入力行や確認プロンプトへの応答を取得し、
/// アプリケーション層で使用可能な形式に変換します。
use crate::domain::media::{Format, Quality};
use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, Write};

/// 対話シェルのコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// 入力欄のURLを設定（送信はしない）
    SetUrl(String),
    /// 送信（URL省略時は設定済みのURL）
    Submit(Option<String>),
    Format(Format),
    Quality(Option<Quality>),
    Confirm,
    Download,
    Reset,
    Help,
    Quit,
}

/// シェルの入力行を解釈する
///
/// 空行は`Ok(None)`。
pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "url" => ShellCommand::SetUrl(rest.to_string()),
        "submit" | "convert" => ShellCommand::Submit((!rest.is_empty()).then(|| rest.to_string())),
        "format" => ShellCommand::Format(
            Format::from_input(rest)
                .with_context(|| format!("Unknown format '{}'. Use 'audio' or 'video'.", rest))?,
        ),
        "quality" => ShellCommand::Quality(parse_quality_arg(rest)?),
        "confirm" | "yes" => ShellCommand::Confirm,
        "download" => ShellCommand::Download,
        "reset" => ShellCommand::Reset,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => bail!("Unknown command '{}'. Type 'help' for available commands.", other),
    };

    Ok(Some(parsed))
}

/// 画質の指定を解釈する（"1".."5" または "none"）
pub fn parse_quality_arg(value: &str) -> Result<Option<Quality>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let level: u8 = value
        .parse()
        .with_context(|| format!("Invalid quality '{}'. Use a number from 1 to 5.", value))?;
    match Quality::from_level(level) {
        Some(quality) => Ok(Some(quality)),
        None => bail!(
            "Invalid quality '{}'. Use 1 (144p), 2 (360p), 3 (720p), 4 (1080p) or 5 (max).",
            level
        ),
    }
}

/// 確認プロンプトを表示してyes/noを取得（stdin）
pub fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N]: ", prompt);
    io::stderr().flush()?;
    confirm_from(&mut io::stdin().lock())
}

/// 任意の入力から確認応答を読み取る
///
/// 入力が終わっている場合は「いいえ」として扱う。
pub fn confirm_from<R: BufRead>(reader: &mut R) -> Result<bool> {
    let mut answer = String::new();
    reader
        .read_line(&mut answer)
        .context("Failed to read confirmation from input")?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
