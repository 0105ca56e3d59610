use crate::commands::result::{CommandResult, ShellResult};
use crate::config::UserConfig;
use crate::domain::workflow::Intent;
use crate::presentation::input::{ShellCommand, parse_shell_line};
use crate::presentation::output::print_shell_help;
use crate::presentation::sink;
use crate::session::HttpSession;
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// 操作チャネルの容量
const INTENT_BUFFER: usize = 16;

/// 入力1行の解釈結果
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineOutcome {
    Intent(Intent),
    Help,
    Quit,
}

/// 対話シェルを実行する
///
/// 標準入力の各行を操作としてセッションへ送ります。
/// 入力の読み取りは別タスクで行うため、変換中でもリセットなどを受け付けます。
pub async fn execute(machine_output: bool) -> Result<CommandResult> {
    let user_config = UserConfig::load()
        .context("Failed to load user configuration. Please check your config.toml file.")?;

    let mut session = HttpSession::from_config(
        &user_config,
        user_config.preview,
        sink::for_output(machine_output, !machine_output),
    )
    .context("Failed to create conversion client")?;

    if !machine_output {
        eprintln!("Type 'help' for available commands.");
    }

    let (tx, rx) = mpsc::channel(INTENT_BUFFER);
    let reader = tokio::spawn(read_intents(tx));

    session.run(rx).await;

    // 入力終了時に処理中の操作があれば結果を待つ
    if session.controller().state().is_busy() {
        debug!("waiting for in-flight operation before exit");
        session.settle().await;
    }

    reader
        .await
        .context("Input reader task panicked")?
        .context("Failed to read shell input")?;

    let controller = session.controller();
    Ok(CommandResult::Shell(ShellResult {
        final_state: controller.state().name(),
        last_saved_path: controller.saved_path().cloned(),
    }))
}

/// 標準入力を読み、操作に変換して送る
///
/// `quit`または入力終了で戻り、送信側を破棄してセッションを終了させる。
async fn read_intents(tx: mpsc::Sender<Intent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current_url = None;

    while let Some(line) = lines.next_line().await? {
        let command = match parse_shell_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("✗ {}", e);
                continue;
            }
        };

        match translate(command, &mut current_url) {
            LineOutcome::Intent(intent) => {
                if tx.send(intent).await.is_err() {
                    return Ok(());
                }
            }
            LineOutcome::Help => print_shell_help(),
            LineOutcome::Quit => break,
        }
    }

    Ok(())
}

/// シェルのコマンドを操作に変換する
///
/// `current_url`は入力欄に相当し、`url`で設定され`submit`で送信される。
fn translate(command: ShellCommand, current_url: &mut Option<String>) -> LineOutcome {
    let intent = match command {
        ShellCommand::SetUrl(url) => {
            *current_url = Some(url);
            Intent::EditInput
        }
        ShellCommand::Submit(Some(url)) => {
            *current_url = Some(url.clone());
            Intent::Submit(url)
        }
        ShellCommand::Submit(None) => Intent::Submit(current_url.clone().unwrap_or_default()),
        ShellCommand::Format(format) => Intent::SelectFormat(format),
        ShellCommand::Quality(quality) => Intent::SelectQuality(quality),
        ShellCommand::Confirm => Intent::Confirm,
        ShellCommand::Download => Intent::Download,
        ShellCommand::Reset => {
            *current_url = None;
            Intent::Reset
        }
        ShellCommand::Help => return LineOutcome::Help,
        ShellCommand::Quit => return LineOutcome::Quit,
    };

    LineOutcome::Intent(intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::{Format, Quality};

    const URL: &str = "https://youtu.be/dQw4w9WgXcQ";

    fn intent(outcome: LineOutcome) -> Intent {
        match outcome {
            LineOutcome::Intent(intent) => intent,
            other => panic!("expected an intent, got {other:?}"),
        }
    }

    #[test]
    fn test_url_then_submit_uses_current_url() {
        let mut current = None;

        assert_eq!(
            intent(translate(ShellCommand::SetUrl(URL.to_string()), &mut current)),
            Intent::EditInput
        );
        assert_eq!(
            intent(translate(ShellCommand::Submit(None), &mut current)),
            Intent::Submit(URL.to_string())
        );
    }

    #[test]
    fn test_submit_without_url_sends_empty_input() {
        let mut current = None;
        assert_eq!(
            intent(translate(ShellCommand::Submit(None), &mut current)),
            Intent::Submit(String::new())
        );
    }

    #[test]
    fn test_reset_clears_current_url() {
        let mut current = Some(URL.to_string());
        assert_eq!(
            intent(translate(ShellCommand::Reset, &mut current)),
            Intent::Reset
        );
        assert!(current.is_none());
    }

    #[test]
    fn test_selection_commands() {
        let mut current = None;
        assert_eq!(
            intent(translate(ShellCommand::Format(Format::Video), &mut current)),
            Intent::SelectFormat(Format::Video)
        );
        assert_eq!(
            intent(translate(
                ShellCommand::Quality(Some(Quality::P360)),
                &mut current
            )),
            Intent::SelectQuality(Some(Quality::P360))
        );
        assert_eq!(translate(ShellCommand::Help, &mut current), LineOutcome::Help);
        assert_eq!(translate(ShellCommand::Quit, &mut current), LineOutcome::Quit);
    }

    #[test]
    fn test_each_line_yields_one_intent() {
        let mut current = None;
        assert_eq!(
            translate(ShellCommand::Submit(Some(URL.to_string())), &mut current),
            LineOutcome::Intent(Intent::Submit(URL.to_string()))
        );
        assert_eq!(current.as_deref(), Some(URL));
        assert_eq!(
            translate(ShellCommand::Download, &mut current),
            LineOutcome::Intent(Intent::Download)
        );
    }
}
