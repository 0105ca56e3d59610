/// プレゼンテーション層: 状態スナップショットの出力先
///
/// - `TerminalSink`: 人間向け（stderr）。状態が変わったときだけ表示する。
///   受け付けなかった操作の通知は毎回表示する。
/// - `JsonSink`: 機械向け（stdout）。スナップショットごとに1行のJSON。
use crate::domain::state::{Controls, WorkflowSnapshot};
use crate::domain::workflow::PresentationSink;
use crate::presentation::progress::{DisplayProgress, ProgressCategory};
use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

/// 出力モードに応じたシンクを選ぶ
///
/// * `machine_output` - trueならstdoutへJSON Lines、falseならstderrへ人間向け表示
/// * `show_actions` - 人間向け表示で利用可能な操作を併記するか（対話シェル用）
pub fn for_output(machine_output: bool, show_actions: bool) -> Box<dyn PresentationSink> {
    if machine_output {
        Box::new(JsonSink::stdout())
    } else {
        Box::new(TerminalSink::stderr(show_actions))
    }
}

/// 進捗バーの幅（文字数）
const BAR_WIDTH: usize = 20;

/// 人間向けの表示
pub struct TerminalSink<W: Write = io::Stderr> {
    out: W,
    last: Option<DisplayProgress>,
    /// 変換中の行を`\r`で上書きしているか
    progress_line_open: bool,
    /// 対話モードで利用可能な操作を表示するか
    show_actions: bool,
}

impl TerminalSink<io::Stderr> {
    pub fn stderr(show_actions: bool) -> Self {
        Self::new(io::stderr(), show_actions)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, show_actions: bool) -> Self {
        Self {
            out,
            last: None,
            progress_line_open: false,
            show_actions,
        }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn render(&mut self, display: &DisplayProgress, controls: &Controls) -> io::Result<()> {
        if display.category == ProgressCategory::Conversion {
            let percent = display.percent.unwrap_or(0);
            write!(
                self.out,
                "\r{} {} {:>3}%",
                display.message,
                progress_bar(percent),
                percent
            )?;
            self.progress_line_open = true;
            return self.out.flush();
        }

        self.close_progress_line()?;
        match display.category {
            ProgressCategory::Validation | ProgressCategory::Failed => {
                writeln!(self.out, "✗ {}", display.message)?
            }
            ProgressCategory::Completed => writeln!(self.out, "✓ {}", display.message)?,
            _ => writeln!(self.out, "{}", display.message)?,
        }
        if let Some(details) = &display.details {
            writeln!(self.out, "  {}", details)?;
        }
        if self.show_actions {
            let actions = available_actions(controls);
            if !actions.is_empty() {
                writeln!(self.out, "  [{}]", actions.join(" | "))?;
            }
        }
        self.out.flush()
    }

    fn render_notice(&mut self, notice: &str) -> io::Result<()> {
        self.close_progress_line()?;
        writeln!(self.out, "! {}", notice)?;
        self.out.flush()
    }

    fn close_progress_line(&mut self) -> io::Result<()> {
        if self.progress_line_open {
            self.progress_line_open = false;
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn publish(&mut self, snapshot: &WorkflowSnapshot) {
        if let Some(notice) = &snapshot.notice {
            if let Err(e) = self.render_notice(notice) {
                warn!("failed to write to terminal: {}", e);
            }
            return;
        }

        let display = Option::<DisplayProgress>::from(snapshot);
        if display == self.last {
            return;
        }

        let result = match &display {
            Some(display) => self.render(display, &snapshot.controls),
            None => self.close_progress_line(),
        };
        if let Err(e) = result {
            warn!("failed to write to terminal: {}", e);
        }
        self.last = display;
    }
}

/// 現在実行できる操作（対話モードのコマンド名）
fn available_actions(controls: &Controls) -> Vec<&'static str> {
    let mut actions = Vec::new();
    if controls.submit_enabled {
        actions.push("submit <url>");
    }
    if controls.format_enabled {
        actions.push("format audio|video");
    }
    if controls.quality_enabled {
        actions.push("quality 1-5");
    }
    if controls.confirm_enabled {
        actions.push("confirm");
    }
    if controls.download_enabled {
        actions.push("download");
    }
    if controls.reset_visible {
        actions.push("reset");
    }
    actions
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// 機械可読な出力（JSON Lines）
pub struct JsonSink<W: Write = io::Stdout> {
    out: W,
}

#[derive(Serialize)]
struct SnapshotEvent<'a> {
    event: &'static str,
    emitted_at: String,
    #[serde(flatten)]
    snapshot: &'a WorkflowSnapshot,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.out
    }
}

impl<W: Write> PresentationSink for JsonSink<W> {
    fn publish(&mut self, snapshot: &WorkflowSnapshot) {
        let event = SnapshotEvent {
            event: "snapshot",
            emitted_at: Utc::now().to_rfc3339(),
            snapshot,
        };

        let result = serde_json::to_string(&event)
            .map_err(io::Error::from)
            .and_then(|line| writeln!(self.out, "{}", line))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("failed to write snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::media::Format;
    use crate::domain::state::{RequestToken, WorkflowState};

    fn snapshot(state: WorkflowState, progress: Option<u8>) -> WorkflowSnapshot {
        WorkflowSnapshot {
            controls: Controls::derive(&state, Format::Audio),
            state,
            format: Format::Audio,
            quality: None,
            metadata: None,
            progress,
            error: None,
            input_error: None,
            handle: None,
            saved_path: None,
            notice: None,
        }
    }

    fn converting(progress: u8) -> WorkflowSnapshot {
        snapshot(
            WorkflowState::Converting {
                token: RequestToken::new(1),
            },
            Some(progress),
        )
    }

    fn output(sink: &TerminalSink<Vec<u8>>) -> String {
        String::from_utf8(sink.writer().clone()).unwrap()
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), format!("[{}]", " ".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), " ".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn test_terminal_overwrites_progress_line() {
        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.publish(&converting(0));
        sink.publish(&converting(10));
        sink.publish(&snapshot(
            WorkflowState::Error {
                kind: ErrorKind::NetworkError,
                message: "offline".to_string(),
            },
            None,
        ));

        let text = output(&sink);
        assert!(text.starts_with("\rConverting to MP3"));
        assert!(text.contains(" 10%\n✗ offline\n  NETWORK_ERROR\n"));
    }

    #[test]
    fn test_terminal_skips_duplicates() {
        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.publish(&snapshot(WorkflowState::Validating, None));
        sink.publish(&snapshot(WorkflowState::Validating, None));
        assert_eq!(output(&sink), "Validating URL...\n");
    }

    #[test]
    fn test_terminal_prints_every_notice() {
        let mut sink = TerminalSink::new(Vec::new(), false);
        sink.publish(&converting(10));

        let mut rejected = converting(10);
        rejected.notice = Some("A request is already in progress.".to_string());
        sink.publish(&rejected);
        sink.publish(&rejected);
        sink.publish(&converting(20));

        let text = output(&sink);
        assert_eq!(
            text.matches("! A request is already in progress.\n").count(),
            2,
            "{text}"
        );
        assert!(
            text.ends_with("progress.\n\rConverting to MP3 [####                ]  20%"),
            "{text}"
        );
    }

    #[test]
    fn test_terminal_shows_actions_in_shell_mode() {
        let mut sink = TerminalSink::new(Vec::new(), true);
        sink.publish(&snapshot(WorkflowState::Ready, Some(100)));
        let text = output(&sink);
        assert!(text.contains("[download | reset]"), "{text}");
    }

    #[test]
    fn test_json_sink_writes_one_line_per_snapshot() {
        let mut sink = JsonSink::new(Vec::new());
        sink.publish(&converting(30));
        sink.publish(&converting(40));

        let text = String::from_utf8(sink.writer().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["event"], "snapshot");
        assert_eq!(value["state"]["phase"], "converting");
        assert_eq!(value["progress"], 40);
        assert_eq!(value["controls"]["submit_enabled"], false);
        assert!(value["emitted_at"].as_str().is_some());
        assert!(value["notice"].is_null());
    }

    #[test]
    fn test_json_sink_includes_notice() {
        let mut sink = JsonSink::new(Vec::new());
        let mut rejected = snapshot(WorkflowState::Idle, None);
        rejected.notice = Some("Nothing to download yet.".to_string());
        sink.publish(&rejected);

        let text = String::from_utf8(sink.writer().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["notice"], "Nothing to download yet.");
        assert_eq!(value["state"]["phase"], "idle");
    }
}
