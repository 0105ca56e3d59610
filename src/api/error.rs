/// インフラ層のエラー定義
///
/// 変換サービスとの通信およびファイル保存で発生するエラーを構造化して定義。
/// #[from] / #[source] を使って原因連鎖を保持する。
use crate::domain::error::ErrorKind;
use crate::domain::workflow::ServiceFailure;
use crate::error_severity::ErrorSeverity;
use std::io;
use thiserror::Error;
use tracing::debug;

/// 変換サービスに対する操作の種類
///
/// 非2xx応答をどのエラーとして扱うかを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOperation {
    Metadata,
    Conversion,
    Download,
}

impl ServiceOperation {
    /// サービスがメッセージを返さなかった場合の文言
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Metadata => "Could not fetch video information",
            Self::Conversion => "Error converting the video",
            Self::Download => "The selected quality is not available",
        }
    }

    /// この操作の失敗を表すエラーを作成
    pub fn failure(self, message: Option<String>, status_code: Option<u16>) -> InfraError {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.default_message().to_string());
        match self {
            Self::Metadata => InfraError::metadata_unavailable(message, status_code),
            Self::Conversion => InfraError::conversion_failed(message, status_code),
            Self::Download => InfraError::download_failed(message, status_code),
        }
    }
}

#[derive(Error, Debug)]
pub enum InfraError {
    /// サービスに到達できない（接続失敗、応答の破損）
    #[error("network error: {message}")]
    Network { message: String },

    /// タイムアウトエラー
    #[error("operation timed out: {operation}")]
    Timeout { operation: String },

    /// メタデータ取得の失敗
    #[error("metadata unavailable: {message}")]
    MetadataUnavailable {
        message: String,
        status_code: Option<u16>,
    },

    /// サービスが変換を拒否した
    #[error("conversion failed: {message}")]
    ConversionFailed {
        message: String,
        status_code: Option<u16>,
    },

    /// 変換済みファイルの取得・保存の失敗
    #[error("download failed: {message}")]
    DownloadFailed {
        message: String,
        status_code: Option<u16>,
    },

    /// その他のI/Oエラー
    #[error("I/O error")]
    Io(#[from] io::Error),
}

impl InfraError {
    /// ネットワークエラーを作成
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// タイムアウトエラーを作成
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn metadata_unavailable(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::MetadataUnavailable {
            message: message.into(),
            status_code,
        }
    }

    pub fn conversion_failed(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::ConversionFailed {
            message: message.into(),
            status_code,
        }
    }

    pub fn download_failed(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
            status_code,
        }
    }

    /// ワークフロー上のエラー種別
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => ErrorKind::NetworkError,
            Self::MetadataUnavailable { .. } => ErrorKind::MetadataUnavailable,
            Self::ConversionFailed { .. } => ErrorKind::ConversionFailed,
            Self::DownloadFailed { .. } | Self::Io(_) => ErrorKind::DownloadFailed,
        }
    }

    /// ユーザーに表示するメッセージ
    ///
    /// サービスが返したメッセージはそのまま伝える。
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "Could not reach the conversion service. Check your connection.".to_string()
            }
            Self::Timeout { .. } => "The conversion service did not respond in time.".to_string(),
            Self::MetadataUnavailable { message, .. }
            | Self::ConversionFailed { message, .. }
            | Self::DownloadFailed { message, .. } => message.clone(),
            Self::Io(e) => format!("Could not save the file: {}", e),
        }
    }

    /// HTTPステータスコード（存在する場合）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::MetadataUnavailable { status_code, .. }
            | Self::ConversionFailed { status_code, .. }
            | Self::DownloadFailed { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// エラーの深刻度を返す
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::SystemError
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => Some(
                "Make sure the conversion server is running and `server_url` in config.toml is correct.",
            ),
            Self::ConversionFailed { .. } => {
                Some("Try a lower quality or a different video.")
            }
            Self::Io(_) => Some("Check that `output_dir` exists and is writable."),
            _ => None,
        }
    }
}

impl From<&InfraError> for ServiceFailure {
    fn from(error: &InfraError) -> Self {
        if let Some(status) = error.status_code() {
            debug!(status, "service answered with an error status: {}", error);
        }
        ServiceFailure::new(error.kind(), error.user_message())
    }
}

impl From<InfraError> for ServiceFailure {
    fn from(error: InfraError) -> Self {
        ServiceFailure::from(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(InfraError::network("x").kind(), ErrorKind::NetworkError);
        assert_eq!(InfraError::timeout("GET /info").kind(), ErrorKind::NetworkError);
        assert_eq!(
            InfraError::metadata_unavailable("x", Some(404)).kind(),
            ErrorKind::MetadataUnavailable
        );
        assert_eq!(
            InfraError::conversion_failed("x", None).kind(),
            ErrorKind::ConversionFailed
        );
        let io = InfraError::from(io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::DownloadFailed);
    }

    #[test]
    fn test_service_message_propagated_verbatim() {
        let failure = ServiceFailure::from(InfraError::conversion_failed(
            "quality unavailable",
            Some(400),
        ));
        assert_eq!(failure.kind, ErrorKind::ConversionFailed);
        assert_eq!(failure.message, "quality unavailable");
    }

    #[test]
    fn test_network_message_is_generic() {
        let failure = ServiceFailure::from(InfraError::network("tcp connect error: refused"));
        assert_eq!(failure.kind, ErrorKind::NetworkError);
        assert!(!failure.message.contains("tcp"));
    }

    #[test]
    fn test_operation_failure_default_message() {
        let error = ServiceOperation::Download.failure(None, Some(404));
        assert_eq!(error.kind(), ErrorKind::DownloadFailed);
        assert_eq!(error.user_message(), "The selected quality is not available");

        let error = ServiceOperation::Metadata.failure(Some("  ".to_string()), None);
        assert_eq!(error.user_message(), "Could not fetch video information");

        let error = ServiceOperation::Conversion.failure(Some("busy".to_string()), Some(503));
        assert_eq!(error.user_message(), "busy");
        assert_eq!(error.status_code(), Some(503));
    }

    #[test]
    fn test_status_code_and_severity() {
        let error = InfraError::download_failed("gone", Some(410));
        assert_eq!(error.status_code(), Some(410));
        assert_eq!(error.severity(), ErrorSeverity::SystemError);
        assert_eq!(InfraError::network("x").status_code(), None);
    }
}
