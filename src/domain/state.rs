/// ドメイン層: ワークフロー状態と派生表示状態
///
/// `WorkflowState`が唯一の状態であり、入力欄やボタンの有効/無効、
/// 表示パネルはすべて`Controls::derive`によって状態から導出される。
/// 独立したフラグを持たないため、エラー後にコントロールが
/// 無効のまま残るといった不整合は起こらない。
use crate::domain::error::ErrorKind;
use crate::domain::media::{DownloadHandle, Format, Quality, VideoMetadata};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// ネットワーク操作ごとに発行される識別子
///
/// 保留中の状態は自身の操作のトークンを保持し、一致しない応答は破棄される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// ワークフローの状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WorkflowState {
    /// 初期状態（リセット後も含む）
    Idle,
    /// 入力検証中（同期的な一時状態）
    Validating,
    /// メタデータ取得中
    FetchingMetadata { token: RequestToken },
    /// メタデータ表示済み、確認待ち
    AwaitingConfirmation,
    /// 変換中
    Converting { token: RequestToken },
    /// ダウンロード可能
    Ready,
    /// ファイル保存中（完了後Readyへ戻る）
    Downloading { token: RequestToken },
    /// サービスエラー
    Error { kind: ErrorKind, message: String },
}

impl WorkflowState {
    /// ネットワーク操作（または検証）が進行中か
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating
                | Self::FetchingMetadata { .. }
                | Self::Converting { .. }
                | Self::Downloading { .. }
        )
    }

    /// 進行中の操作のトークン
    pub fn pending_token(&self) -> Option<RequestToken> {
        match self {
            Self::FetchingMetadata { token }
            | Self::Converting { token }
            | Self::Downloading { token } => Some(*token),
            _ => None,
        }
    }

    /// 状態名（ログ・表示用）
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::FetchingMetadata { .. } => "fetching_metadata",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Converting { .. } => "converting",
            Self::Ready => "ready",
            Self::Downloading { .. } => "downloading",
            Self::Error { .. } => "error",
        }
    }
}

/// 表示するパネル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    /// URL入力フォーム
    Form,
    /// 動画情報のプレビュー
    Preview,
    /// 進捗表示
    Progress,
    /// 完了（ダウンロードボタン）
    Result,
    /// エラー表示
    Error,
}

/// 状態から導出されるコントロールの有効/無効
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub input_enabled: bool,
    pub format_enabled: bool,
    pub quality_visible: bool,
    pub quality_enabled: bool,
    pub submit_enabled: bool,
    pub confirm_enabled: bool,
    pub download_enabled: bool,
    pub reset_visible: bool,
    pub panel: Panel,
}

impl Controls {
    /// 状態と形式選択からコントロール状態を導出する（純粋関数）
    pub fn derive(state: &WorkflowState, format: Format) -> Self {
        let editable = matches!(state, WorkflowState::Idle | WorkflowState::Error { .. });
        let panel = match state {
            WorkflowState::Idle | WorkflowState::Validating | WorkflowState::FetchingMetadata { .. } => {
                Panel::Form
            }
            WorkflowState::AwaitingConfirmation => Panel::Preview,
            WorkflowState::Converting { .. } => Panel::Progress,
            WorkflowState::Ready | WorkflowState::Downloading { .. } => Panel::Result,
            WorkflowState::Error { .. } => Panel::Error,
        };

        Self {
            input_enabled: editable,
            format_enabled: editable,
            quality_visible: format == Format::Video,
            quality_enabled: editable && format == Format::Video,
            submit_enabled: editable,
            confirm_enabled: matches!(state, WorkflowState::AwaitingConfirmation),
            download_enabled: matches!(
                state,
                WorkflowState::Ready
                    | WorkflowState::Error {
                        kind: ErrorKind::DownloadFailed,
                        ..
                    }
            ),
            reset_visible: matches!(
                state,
                WorkflowState::AwaitingConfirmation
                    | WorkflowState::Ready
                    | WorkflowState::Error { .. }
            ),
            panel,
        }
    }
}

/// インライン表示される検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputError {
    pub kind: ErrorKind,
    pub message: String,
}

/// プレゼンテーションシンクへ送られる状態のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub format: Format,
    pub quality: Option<Quality>,
    pub controls: Controls,
    pub metadata: Option<VideoMetadata>,
    /// 変換中および完了後のみ値を持つ（0..=100）
    pub progress: Option<u8>,
    /// サービスエラーのメッセージ
    pub error: Option<String>,
    pub input_error: Option<InputError>,
    pub handle: Option<DownloadHandle>,
    pub saved_path: Option<PathBuf>,
    /// 受け付けなかった操作の通知（その1回のスナップショットのみ）
    pub notice: Option<String>,
}
