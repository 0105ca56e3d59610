/// プレゼンテーション層: ワークフロー表示DTO
///
/// ドメイン層の`WorkflowSnapshot`をUI表示に適した形式に変換します。
/// この変換により、プレゼンテーション層がドメイン層の実装詳細に
/// 依存しないようにします。
///
/// # 設計方針
/// - `From<&WorkflowSnapshot>`で借用による変換（所有権を奪わない）
/// - `Option<DisplayProgress>`で表示抑制を明示的に表現
/// - ヘルパー関数で各状態の変換ロジックを分離
use crate::domain::formatter::{format_duration, format_views};
use crate::domain::media::{Format, Quality, VideoMetadata};
use crate::domain::state::{WorkflowSnapshot, WorkflowState};
use std::path::Path;

/// 進捗表示のカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCategory {
    /// 入力検証
    Validation,
    /// 動画情報の取得・表示
    Metadata,
    /// 変換中（パーセンテージ付き）
    Conversion,
    /// ファイル保存中
    Transfer,
    /// 完了
    Completed,
    /// 失敗
    Failed,
}

/// プレゼンテーション層用の進捗情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayProgress {
    /// 表示用メッセージ
    pub message: String,
    /// 進捗カテゴリ
    pub category: ProgressCategory,
    /// 変換の進捗（%）
    pub percent: Option<u8>,
    /// 詳細情報（オプション）
    pub details: Option<String>,
}

impl DisplayProgress {
    /// 新しい表示用進捗情報を作成
    pub fn new(message: String, category: ProgressCategory) -> Self {
        Self {
            message,
            category,
            percent: None,
            details: None,
        }
    }

    /// 詳細情報を追加
    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent);
        self
    }
}

/// `WorkflowSnapshot`から`DisplayProgress`への変換
///
/// # 戻り値
/// - `Some(DisplayProgress)`: 表示すべき情報
/// - `None`: 表示するものがない（入力待ちのIdleなど）
impl From<&WorkflowSnapshot> for Option<DisplayProgress> {
    fn from(snapshot: &WorkflowSnapshot) -> Self {
        if let Some(input_error) = &snapshot.input_error {
            return Some(
                DisplayProgress::new(input_error.message.clone(), ProgressCategory::Validation)
                    .with_details(input_error.kind.code().to_string()),
            );
        }

        match &snapshot.state {
            WorkflowState::Idle => None,
            WorkflowState::Validating => Some(DisplayProgress::new(
                "Validating URL...".to_string(),
                ProgressCategory::Validation,
            )),
            WorkflowState::FetchingMetadata { .. } => Some(DisplayProgress::new(
                "Fetching video information...".to_string(),
                ProgressCategory::Metadata,
            )),
            WorkflowState::AwaitingConfirmation => {
                snapshot.metadata.as_ref().map(format_preview)
            }
            WorkflowState::Converting { .. } => Some(format_converting(
                snapshot.format,
                snapshot.quality,
                snapshot.progress.unwrap_or(0),
            )),
            WorkflowState::Ready => Some(format_ready(
                snapshot.handle.as_ref().map(|h| h.url.as_str()),
                snapshot.saved_path.as_deref(),
            )),
            WorkflowState::Downloading { .. } => Some(DisplayProgress::new(
                "Downloading file...".to_string(),
                ProgressCategory::Transfer,
            )),
            WorkflowState::Error { kind, message } => Some(
                DisplayProgress::new(message.clone(), ProgressCategory::Failed)
                    .with_details(kind.code().to_string()),
            ),
        }
    }
}

fn format_preview(metadata: &VideoMetadata) -> DisplayProgress {
    let channel = if metadata.channel.is_empty() {
        "unknown channel"
    } else {
        metadata.channel.as_str()
    };

    DisplayProgress::new(
        format!("{} ({})", metadata.title, channel),
        ProgressCategory::Metadata,
    )
    .with_details(format!(
        "Duration: {} | Views: {} | Thumbnail: {}",
        format_duration(metadata.duration_seconds),
        format_views(metadata.view_count),
        metadata.thumbnail_url
    ))
}

fn format_converting(format: Format, quality: Option<Quality>, percent: u8) -> DisplayProgress {
    let target = match (format, quality) {
        (Format::Video, Some(q)) => format!("MP4 {}", q.label()),
        _ => format.extension().to_ascii_uppercase(),
    };

    DisplayProgress::new(format!("Converting to {}", target), ProgressCategory::Conversion)
        .with_percent(percent)
}

fn format_ready(url: Option<&str>, saved_path: Option<&Path>) -> DisplayProgress {
    match saved_path {
        Some(path) => DisplayProgress::new(
            format!("Saved to {}", path.display()),
            ProgressCategory::Completed,
        ),
        None => {
            let progress =
                DisplayProgress::new("Conversion complete".to_string(), ProgressCategory::Completed);
            match url {
                Some(url) => progress.with_details(format!("Download URL: {}", url)),
                None => progress,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::media::DownloadHandle;
    use crate::domain::state::{Controls, InputError, RequestToken};
    use std::path::PathBuf;

    fn snapshot(state: WorkflowState) -> WorkflowSnapshot {
        WorkflowSnapshot {
            controls: Controls::derive(&state, Format::Audio),
            state,
            format: Format::Audio,
            quality: None,
            metadata: None,
            progress: None,
            error: None,
            input_error: None,
            handle: None,
            saved_path: None,
            notice: None,
        }
    }

    fn display(snapshot: &WorkflowSnapshot) -> Option<DisplayProgress> {
        Option::<DisplayProgress>::from(snapshot)
    }

    #[test]
    fn test_idle_is_not_displayed() {
        assert!(display(&snapshot(WorkflowState::Idle)).is_none());
    }

    #[test]
    fn test_input_error_takes_precedence() {
        let mut s = snapshot(WorkflowState::Idle);
        s.input_error = Some(InputError {
            kind: ErrorKind::InvalidUrl,
            message: "invalid YouTube URL: x".to_string(),
        });

        let progress = display(&s).expect("input error should be displayed");
        assert_eq!(progress.category, ProgressCategory::Validation);
        assert_eq!(progress.message, "invalid YouTube URL: x");
        assert_eq!(progress.details.as_deref(), Some("INVALID_URL"));
    }

    #[test]
    fn test_preview_contains_formatted_metadata() {
        let mut s = snapshot(WorkflowState::AwaitingConfirmation);
        s.metadata = Some(VideoMetadata {
            title: "Song".to_string(),
            channel: "Artist".to_string(),
            duration_seconds: 212,
            view_count: 1_500,
            thumbnail_url: "https://i.ytimg.com/vi/x/hqdefault.jpg".to_string(),
        });

        let progress = display(&s).unwrap();
        assert_eq!(progress.message, "Song (Artist)");
        let details = progress.details.unwrap();
        assert!(details.contains("3:32"));
        assert!(details.contains("1.5K"));
    }

    #[test]
    fn test_converting_carries_percent() {
        let mut s = snapshot(WorkflowState::Converting {
            token: RequestToken::new(1),
        });
        s.format = Format::Video;
        s.quality = Some(Quality::P720);
        s.progress = Some(40);

        let progress = display(&s).unwrap();
        assert_eq!(progress.message, "Converting to MP4 720p");
        assert_eq!(progress.percent, Some(40));
        assert_eq!(progress.category, ProgressCategory::Conversion);
    }

    #[test]
    fn test_ready_before_and_after_download() {
        let mut s = snapshot(WorkflowState::Ready);
        s.handle = Some(DownloadHandle {
            url: "http://x/a.mp3".to_string(),
            format: Format::Audio,
        });
        let before = display(&s).unwrap();
        assert_eq!(before.details.as_deref(), Some("Download URL: http://x/a.mp3"));

        s.saved_path = Some(PathBuf::from("/tmp/a.mp3"));
        let after = display(&s).unwrap();
        assert_eq!(after.message, "Saved to /tmp/a.mp3");
    }

    #[test]
    fn test_error_state() {
        let s = snapshot(WorkflowState::Error {
            kind: ErrorKind::ConversionFailed,
            message: "quality unavailable".to_string(),
        });
        let progress = display(&s).unwrap();
        assert_eq!(progress.category, ProgressCategory::Failed);
        assert_eq!(progress.message, "quality unavailable");
        assert_eq!(progress.details.as_deref(), Some("CONVERSION_FAILED"));
    }
}
