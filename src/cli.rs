use crate::commands::{self, CommandResult, convert::ConvertOptions};
use crate::domain::media::Format;
use crate::presentation::input::parse_quality_arg;
use anyhow::{Context, Result, bail};

/// グローバルフラグ（コマンド名より前に指定する）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalFlags {
    /// 機械可読出力（stdoutへJSON）
    pub machine: bool,
    /// デバッグログを表示
    pub verbose: bool,
}

/// 先頭のグローバルフラグを取り除く
///
/// `args[0]`（プログラム名）は含まない残りの引数を返す。
pub fn split_global_flags(args: &[String]) -> (GlobalFlags, Vec<String>) {
    let mut flags = GlobalFlags::default();
    let mut rest = args.iter().skip(1).peekable();

    while let Some(arg) = rest.peek() {
        match arg.as_str() {
            "--machine" => flags.machine = true,
            "--verbose" | "-v" => flags.verbose = true,
            _ => break,
        }
        rest.next();
    }

    (flags, rest.cloned().collect())
}

/// CLI引数を解析し、適切なコマンドにディスパッチする
///
/// # 引数
/// * `args` - グローバルフラグを取り除いた引数（先頭がコマンド名）
/// * `machine_output` - 機械可読出力フラグ
pub async fn run(args: &[String], machine_output: bool) -> Result<CommandResult> {
    let Some(command) = args.first() else {
        return Ok(CommandResult::Help);
    };

    match command.as_str() {
        "convert" => {
            let options = parse_convert_args(&args[1..])?;
            commands::convert::execute(options, machine_output)
                .await
                .context("Convert command failed")
        }
        "info" => {
            let url = args
                .get(1)
                .context("Please specify a video URL for info command")?;
            commands::info::execute(url)
                .await
                .context("Info command failed")
        }
        "shell" => commands::shell::execute(machine_output)
            .await
            .context("Shell command failed"),
        "help" | "--help" | "-h" => Ok(CommandResult::Help),
        _ => bail!(
            "Unknown command: '{}'. Use 'help' to see available commands.",
            command
        ),
    }
}

/// convertコマンドの引数を解析する
fn parse_convert_args(args: &[String]) -> Result<ConvertOptions> {
    let mut url = None;
    let mut format = Format::default();
    let mut quality = None;
    let mut assume_yes = false;
    let mut no_preview = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                let value = iter.next().context("--format requires a value (audio|video)")?;
                format = Format::from_input(value).with_context(|| {
                    format!("Unknown format '{}'. Use 'audio' or 'video'.", value)
                })?;
            }
            "--quality" | "-q" => {
                let value = iter.next().context("--quality requires a value (1-5)")?;
                quality = parse_quality_arg(value)?;
            }
            "--yes" | "-y" => assume_yes = true,
            "--no-preview" => no_preview = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                bail!("Unknown option for convert: '{}'", flag)
            }
            value => {
                if url.is_some() {
                    bail!("Unexpected argument: '{}'", value);
                }
                url = Some(value.to_string());
            }
        }
    }

    Ok(ConvertOptions {
        url: url.context("Please specify a video URL for convert command")?,
        format,
        quality,
        assume_yes,
        no_preview,
    })
}
