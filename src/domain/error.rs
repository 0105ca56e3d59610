/// ドメイン層のエラー定義
///
/// 入力検証に関するエラーを構造化して定義。
/// 外部クレートのエラーは含まず、純粋にドメインの制約違反を表現する。
use crate::error_severity::ErrorSeverity;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// ユーザーに提示されるエラーの種類
///
/// 入力検証エラー（インライン表示）とサービスエラー（ワークフローをErrorへ遷移）の
/// 両方をひとつの閉じた列挙で表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyUrl,
    InvalidUrl,
    MissingQuality,
    MetadataUnavailable,
    ConversionFailed,
    NetworkError,
    DownloadFailed,
}

impl ErrorKind {
    /// 機械可読なエラーコード
    pub fn code(self) -> &'static str {
        match self {
            Self::EmptyUrl => "EMPTY_URL",
            Self::InvalidUrl => "INVALID_URL",
            Self::MissingQuality => "MISSING_QUALITY",
            Self::MetadataUnavailable => "METADATA_UNAVAILABLE",
            Self::ConversionFailed => "CONVERSION_FAILED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::DownloadFailed => "DOWNLOAD_FAILED",
        }
    }

    /// 入力欄の横に表示される検証エラーか
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::EmptyUrl | Self::InvalidUrl | Self::MissingQuality
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// URLが空（空白のみを含む）
    #[error("please enter a YouTube URL")]
    EmptyUrl,

    /// 受け付けられないURL形式
    #[error("invalid YouTube URL: {input}")]
    InvalidUrl { input: String },

    /// VIDEO形式で画質が未選択
    #[error("please select a quality for video downloads")]
    MissingQuality,
}

impl DomainError {
    /// 無効なURLエラーを生成
    pub fn invalid_url(input: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.into(),
        }
    }

    /// 対応するエラー種別
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUrl => ErrorKind::EmptyUrl,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::MissingQuality => ErrorKind::MissingQuality,
        }
    }

    /// エラーの深刻度を返す
    ///
    /// 終了コードの決定に使用できる
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::UserError
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::EmptyUrl => Some("Paste a video link or an 11-character video id."),
            Self::InvalidUrl { .. } => {
                Some("Example: https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            }
            Self::MissingQuality => Some("Pass --quality 1-5 (1 = 144p, 5 = best available)."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(DomainError::EmptyUrl.kind(), ErrorKind::EmptyUrl);
        assert_eq!(
            DomainError::invalid_url("nope").kind(),
            ErrorKind::InvalidUrl
        );
        assert_eq!(DomainError::MissingQuality.kind(), ErrorKind::MissingQuality);
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ErrorKind::EmptyUrl.is_validation());
        assert!(ErrorKind::MissingQuality.is_validation());
        assert!(!ErrorKind::NetworkError.is_validation());
        assert!(!ErrorKind::ConversionFailed.is_validation());
    }

    #[test]
    fn test_kind_serializes_as_code() {
        let json = serde_json::to_string(&ErrorKind::MetadataUnavailable).unwrap();
        assert_eq!(json, "\"METADATA_UNAVAILABLE\"");
        assert_eq!(ErrorKind::NetworkError.to_string(), "NETWORK_ERROR");
    }

    #[test]
    fn test_hints_present() {
        assert!(DomainError::EmptyUrl.hint().is_some());
        assert!(DomainError::invalid_url("x").hint().unwrap().contains("watch?v="));
    }
}
