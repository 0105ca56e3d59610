/// ドメインサービス: 表示用フォーマット
///
/// 動画の再生時間・再生回数を人間向けの文字列に変換し、
/// 保存ファイル名を決定する。
use crate::domain::media::{Format, Quality};

/// ファイル名に使用できない文字
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// ファイル名の最大文字数（拡張子を除く）
const MAX_FILENAME_CHARS: usize = 100;

/// 再生時間（秒）をフォーマット
///
/// - 0秒: "--:--"
/// - 1時間未満: "M:SS"
/// - 1時間以上: "H:MM:SS"
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "--:--".to_string();
    }

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours == 0 {
        format!("{}:{:02}", minutes, secs)
    } else {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    }
}

/// 再生回数をフォーマット（1.2M, 3.4K など）
pub fn format_views(views: u64) -> String {
    match views {
        0 => "--".to_string(),
        v if v >= 1_000_000 => format!("{:.1}M", v as f64 / 1_000_000.0),
        v if v >= 1_000 => format!("{:.1}K", v as f64 / 1_000.0),
        v => v.to_string(),
    }
}

/// ファイル名として使用できない文字を取り除き、長さを制限する
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c) && !c.is_control())
        .take(MAX_FILENAME_CHARS)
        .collect();
    cleaned.trim().to_string()
}

/// 保存ファイル名を決定する
///
/// # 戻り値
/// - AUDIO: "<stem>.mp3"
/// - VIDEO: "<stem>_<画質ラベル>.mp4"
///
/// 空になった場合は`fallback`（通常は動画ID）を使う。
pub fn output_file_name(stem: &str, fallback: &str, format: Format, quality: Option<Quality>) -> String {
    let mut base = sanitize_filename(stem);
    if base.is_empty() {
        base = sanitize_filename(fallback);
    }

    match (format, quality) {
        (Format::Video, Some(q)) => format!("{}_{}.{}", base, q.label(), format.extension()),
        _ => format!("{}.{}", base, format.extension()),
    }
}
