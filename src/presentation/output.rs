/// プレゼンテーション層: コマンド結果の出力
///
/// コマンド実行結果をユーザー向け（人間可読）または
/// 機械向け（JSON）形式で出力する責務を担います。
/// CLI使用方法の表示もこのモジュールが担当します。
use crate::commands::result::CommandResult;
use crate::domain::formatter::{format_duration, format_views};
use anyhow::Result;

/// ヘルプテキスト（単一の情報源）
pub const HELP_TEXT: &str = "tubeconv
Convert YouTube videos to MP3/MP4 through a conversion service

Usage:
  tubeconv [--machine] [--verbose] <command> [args...]

Global Flags:
  --machine        - Output machine-readable JSON to stdout (for scripting)
                     Works for both success and error cases
  --verbose        - Show debug logs on stderr (RUST_LOG takes precedence)

Available commands:
  convert <url> [--format audio|video] [--quality 1-5] [--yes] [--no-preview]
                   - Convert a video and save the file to the output directory
                     --format:     audio (MP3, default) or video (MP4)
                     --quality:    1=144p 2=360p 3=720p 4=1080p 5=max (video only,
                                   default: max)
                     --yes:        Skip the confirmation prompt after the preview
                     --no-preview: Convert without fetching video information first
  info <url>       - Show title, channel, duration and views of a video
  shell            - Interactive session (type 'help' inside for commands)
  help             - Display this help message

Accepted URLs:
  https://www.youtube.com/watch?v=<id>, https://youtu.be/<id>,
  youtube.com/embed/<id>, youtube.com/v/<id>, or the 11-character <id>

Machine-Readable Output:
  --machine convert <url> --yes  - One JSON snapshot per state change, then a result object

Error Output:
  Normal mode:   Human-readable error messages to stderr
  --machine:     JSON error object with exit_code and hint fields";

/// 対話シェルのヘルプ
pub const SHELL_HELP_TEXT: &str = "Commands:
  url <url>            - Set the video URL
  submit [<url>]       - Validate and start (uses the URL set with 'url' if omitted)
  format audio|video   - Choose the output format
  quality 1-5|none     - Choose the video quality
  confirm              - Convert the previewed video
  download             - Save the converted file (repeatable)
  reset                - Start over
  help                 - Show this help
  quit                 - Leave the shell";

/// コマンド使用方法を表示する
///
/// CLI引数が不正な場合や、ヘルプが必要な場合に呼び出されます。
pub fn print_usage() {
    eprintln!("{}", HELP_TEXT);
}

pub fn print_shell_help() {
    eprintln!("{}", SHELL_HELP_TEXT);
}

/// コマンド結果を適切な形式で出力する
///
/// # Arguments
/// * `result` - コマンド実行結果
/// * `machine_output` - 機械可読出力フラグ
///
/// # Output
/// * `machine_output = false`: 人間向けの詳細メッセージ（stderr）
/// * `machine_output = true`: 機械可読JSON（stdout）
pub fn output_result(result: &CommandResult, machine_output: bool) -> Result<()> {
    if machine_output {
        println!("{}", machine_readable(result)?);
    } else {
        output_human_readable(result);
    }

    Ok(())
}

/// 人間向けの詳細メッセージを出力（stderr）
///
/// 進捗はシンクが逐次表示済みのため、ここでは最終結果のみを表示します。
fn output_human_readable(result: &CommandResult) {
    match result {
        CommandResult::Convert(r) => {
            eprintln!();
            if r.cancelled {
                eprintln!("Conversion cancelled.");
                return;
            }
            if let Some(title) = &r.title {
                eprintln!("Title:    {}", title);
            }
            match r.quality {
                Some(quality) => eprintln!("Format:   {} ({})", r.format, quality),
                None => eprintln!("Format:   {}", r.format),
            }
            if let Some(path) = &r.saved_path {
                eprintln!("Saved to: {}", path.display());
            }
        }
        CommandResult::Info(r) => {
            eprintln!();
            eprintln!("Video Details:");
            eprintln!("==============");
            eprintln!("Video ID:   {}", r.video_id);
            eprintln!("Title:      {}", r.metadata.title);
            eprintln!("Channel:    {}", r.metadata.channel);
            eprintln!("Duration:   {}", format_duration(r.metadata.duration_seconds));
            eprintln!("Views:      {}", format_views(r.metadata.view_count));
            eprintln!("Thumbnail:  {}", r.metadata.thumbnail_url);
            eprintln!("URL:        {}", r.source_url);
        }
        CommandResult::Shell(r) => {
            if let Some(path) = &r.last_saved_path {
                eprintln!("Last file saved: {}", path.display());
            }
            eprintln!("Bye.");
        }
        CommandResult::Help => print_usage(),
    }
}

/// 機械可読JSONを生成
///
/// スクリプトやパイプライン処理のために、
/// コマンド結果を構造化されたJSON形式で返します。
fn machine_readable(result: &CommandResult) -> Result<serde_json::Value> {
    let mut json = match result {
        CommandResult::Help => serde_json::json!({
            "command": "help",
            "usage": HELP_TEXT,
        }),
        other => serde_json::to_value(other)?,
    };

    if let Some(object) = json.as_object_mut() {
        object.insert("success".to_string(), serde_json::Value::Bool(true));
    }
    Ok(json)
}
