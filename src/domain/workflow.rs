/// ドメイン層: ワークフローコントローラ（状態機械）
///
/// URL入力から変換・ダウンロードまでの状態遷移を管理する。
/// ネットワーク処理は行わず、必要な操作を`Effect`として返す。
/// 呼び出し側（セッション）が`Effect`を実行し、結果を`Completion`として戻す。
///
/// ```text
/// Idle ──submit──► Validating ──► FetchingMetadata ──► AwaitingConfirmation ──confirm──► Converting
///                             └──────────────(プレビュー無効)─────────────────────────► Converting
/// Converting ──► Ready ──download──► Downloading ──► Ready
/// 失敗 ──► Error ──reset──► Idle
/// ```
///
/// 保留中の状態はリクエストトークンを保持し、トークンが一致しない応答
/// （リセット後に届いた応答など）は適用されない。
use crate::domain::error::{DomainError, ErrorKind};
use crate::domain::formatter;
use crate::domain::media::{ConversionRequest, DownloadHandle, Format, Quality, VideoId, VideoMetadata};
use crate::domain::progress::{ProgressPolicy, SyntheticProgress};
use crate::domain::state::{Controls, InputError, RequestToken, WorkflowSnapshot, WorkflowState};
use crate::domain::validator;
use crate::error_severity::ErrorSeverity;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 状態の変化を受け取る表示側のインターフェース
///
/// シンクは受け取るだけで、コントローラへ状態を書き戻さない。
pub trait PresentationSink {
    fn publish(&mut self, snapshot: &WorkflowSnapshot);
}

impl<T: PresentationSink + ?Sized> PresentationSink for Box<T> {
    fn publish(&mut self, snapshot: &WorkflowSnapshot) {
        (**self).publish(snapshot);
    }
}

/// ユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Submit(String),
    EditInput,
    SelectFormat(Format),
    SelectQuality(Option<Quality>),
    Confirm,
    Download,
    Reset,
}

/// コントローラが要求するネットワーク操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchMetadata {
        token: RequestToken,
        video_id: VideoId,
    },
    Convert {
        token: RequestToken,
        request: ConversionRequest,
    },
    Download {
        token: RequestToken,
        handle: DownloadHandle,
        file_name: String,
    },
}

/// サービス側の失敗（ユーザー向けメッセージ付き）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// エラーの深刻度を返す（外部要因のため常にシステムエラー）
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::SystemError
    }

    /// ユーザー向けのヒントメッセージを返す
    pub fn hint(&self) -> Option<&str> {
        match self.kind {
            ErrorKind::NetworkError => {
                Some("Make sure the conversion server is running and `server_url` in config.toml is correct.")
            }
            ErrorKind::ConversionFailed => Some("Try a lower quality or a different video."),
            _ => None,
        }
    }
}

/// ネットワーク操作の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Metadata {
        token: RequestToken,
        result: Result<VideoMetadata, ServiceFailure>,
    },
    Conversion {
        token: RequestToken,
        result: Result<DownloadHandle, ServiceFailure>,
    },
    Download {
        token: RequestToken,
        result: Result<PathBuf, ServiceFailure>,
    },
}

impl Completion {
    pub fn token(&self) -> RequestToken {
        match self {
            Self::Metadata { token, .. }
            | Self::Conversion { token, .. }
            | Self::Download { token, .. } => *token,
        }
    }

    /// この結果を待っている状態か
    fn awaited_by(&self, state: &WorkflowState) -> bool {
        match (self, state) {
            (Self::Metadata { token, .. }, WorkflowState::FetchingMetadata { token: pending })
            | (Self::Conversion { token, .. }, WorkflowState::Converting { token: pending })
            | (Self::Download { token, .. }, WorkflowState::Downloading { token: pending }) => {
                token == pending
            }
            _ => false,
        }
    }
}

/// コントローラの動作設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// 変換前にメタデータを取得して確認を求めるか
    pub preview_metadata: bool,
    pub progress: ProgressPolicy,
}

/// ワークフローコントローラ
pub struct WorkflowController<K> {
    state: WorkflowState,
    format: Format,
    quality: Option<Quality>,
    input_error: Option<InputError>,
    request: Option<ConversionRequest>,
    metadata: Option<VideoMetadata>,
    handle: Option<DownloadHandle>,
    saved_path: Option<PathBuf>,
    progress: SyntheticProgress,
    last_token: RequestToken,
    options: WorkflowOptions,
    sink: K,
}

impl<K: PresentationSink> WorkflowController<K> {
    /// Idle状態のコントローラを作成し、初期スナップショットを送る
    pub fn new(options: WorkflowOptions, sink: K) -> Self {
        let mut controller = Self {
            state: WorkflowState::Idle,
            format: Format::default(),
            quality: None,
            input_error: None,
            request: None,
            metadata: None,
            handle: None,
            saved_path: None,
            progress: SyntheticProgress::new(options.progress),
            last_token: RequestToken::new(0),
            options,
            sink,
        };
        controller.publish();
        controller
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }

    pub fn request(&self) -> Option<&ConversionRequest> {
        self.request.as_ref()
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }

    pub fn download_handle(&self) -> Option<&DownloadHandle> {
        self.handle.as_ref()
    }

    pub fn saved_path(&self) -> Option<&PathBuf> {
        self.saved_path.as_ref()
    }

    pub fn input_error(&self) -> Option<&InputError> {
        self.input_error.as_ref()
    }

    pub fn progress(&self) -> u8 {
        self.progress.percent()
    }

    pub fn controls(&self) -> Controls {
        Controls::derive(&self.state, self.format)
    }

    /// 変換中であればそのトークン（進捗タイマーの管理に使用）
    pub fn converting_token(&self) -> Option<RequestToken> {
        match self.state {
            WorkflowState::Converting { token } => Some(token),
            _ => None,
        }
    }

    /// 現在の状態のスナップショット
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let progress = match self.state {
            WorkflowState::Converting { .. }
            | WorkflowState::Ready
            | WorkflowState::Downloading { .. } => Some(self.progress.percent()),
            _ => None,
        };
        let error = match &self.state {
            WorkflowState::Error { message, .. } => Some(message.clone()),
            _ => None,
        };

        WorkflowSnapshot {
            state: self.state.clone(),
            format: self.format,
            quality: self.quality,
            controls: self.controls(),
            metadata: self.metadata.clone(),
            progress,
            error,
            input_error: self.input_error.clone(),
            handle: self.handle.clone(),
            saved_path: self.saved_path.clone(),
            notice: None,
        }
    }

    /// ユーザー操作を適用する
    pub fn handle_intent(&mut self, intent: Intent) -> Option<Effect> {
        match intent {
            Intent::Submit(url) => self.submit(&url),
            Intent::EditInput => {
                self.edit_input();
                None
            }
            Intent::SelectFormat(format) => {
                self.select_format(format);
                None
            }
            Intent::SelectQuality(quality) => {
                self.select_quality(quality);
                None
            }
            Intent::Confirm => self.confirm(),
            Intent::Download => self.download(),
            Intent::Reset => {
                self.reset();
                None
            }
        }
    }

    /// URLを送信する
    ///
    /// 処理中の送信はキューイングせず、通知を1回送って破棄する。
    /// 検証に失敗した場合は状態を変えず、インラインエラーを設定する。
    pub fn submit(&mut self, raw_url: &str) -> Option<Effect> {
        if !self.accepts_input() {
            let notice = if self.state.is_busy() {
                "A request is already in progress."
            } else {
                "Reset before submitting a new URL."
            };
            self.reject("submit", notice);
            return None;
        }

        let resting = std::mem::replace(&mut self.state, WorkflowState::Validating);
        self.input_error = None;
        self.progress.clear();
        self.publish();

        let request = match self.build_request(raw_url) {
            Ok(request) => request,
            Err(e) => {
                info!(kind = %e.kind(), "input rejected: {}", e);
                self.state = resting;
                self.input_error = Some(InputError {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                self.publish();
                return None;
            }
        };

        self.metadata = None;
        self.handle = None;
        self.saved_path = None;

        if self.options.preview_metadata {
            let token = self.issue_token();
            let video_id = request.video_id().clone();
            self.request = Some(request);
            self.state = WorkflowState::FetchingMetadata { token };
            info!(%token, video_id = %video_id, "fetching metadata");
            self.publish();
            Some(Effect::FetchMetadata { token, video_id })
        } else {
            Some(self.begin_conversion(request))
        }
    }

    /// 入力が編集された: インラインエラーを消す
    pub fn edit_input(&mut self) {
        if self.input_error.take().is_some() {
            self.publish();
        }
    }

    /// 出力形式を選択する
    ///
    /// AUDIOでは画質をクリアし、VIDEOで未選択なら最高画質を選ぶ。
    pub fn select_format(&mut self, format: Format) {
        if !self.controls().format_enabled {
            self.reject("select_format", "Format can only be changed before submitting.");
            return;
        }

        self.format = format;
        self.quality = match format {
            Format::Audio => None,
            Format::Video => Some(self.quality.unwrap_or_else(Quality::highest)),
        };
        self.publish();
    }

    /// 画質を選択する（`None`で選択解除）
    pub fn select_quality(&mut self, quality: Option<Quality>) {
        if !self.controls().quality_enabled {
            let notice = if self.format == Format::Audio {
                "Quality applies to video only."
            } else {
                "Quality can only be changed before submitting."
            };
            self.reject("select_quality", notice);
            return;
        }

        self.quality = quality;
        self.publish();
    }

    /// プレビュー後の確認: 変換を開始する
    pub fn confirm(&mut self) -> Option<Effect> {
        if self.state != WorkflowState::AwaitingConfirmation {
            self.reject("confirm", "Nothing to confirm.");
            return None;
        }

        let request = self.request.clone()?;
        Some(self.begin_conversion(request))
    }

    /// ダウンロードを開始する
    ///
    /// Readyから何度でも実行できる。保存に失敗した後も
    /// ハンドルが残っているため、再変換せずに再試行できる。
    pub fn download(&mut self) -> Option<Effect> {
        let handle = match &self.handle {
            Some(handle) if self.controls().download_enabled => handle.clone(),
            _ => {
                let notice = if matches!(self.state, WorkflowState::Downloading { .. }) {
                    "A download is already in progress."
                } else {
                    "Nothing to download yet."
                };
                self.reject("download", notice);
                return None;
            }
        };
        let file_name = self.output_file_name();
        let token = self.issue_token();
        self.state = WorkflowState::Downloading { token };
        info!(%token, url = %handle.url, "downloading");
        self.publish();

        Some(Effect::Download {
            token,
            handle,
            file_name,
        })
    }

    /// すべてを初期状態に戻す
    ///
    /// 処理中の操作はキャンセルされないが、その応答は適用されなくなる。
    pub fn reset(&mut self) {
        if let Some(token) = self.state.pending_token() {
            info!(%token, "reset while request in flight; late response will be ignored");
        }

        self.state = WorkflowState::Idle;
        self.format = Format::default();
        self.quality = None;
        self.input_error = None;
        self.request = None;
        self.metadata = None;
        self.handle = None;
        self.saved_path = None;
        self.progress.clear();
        self.publish();
    }

    /// ネットワーク操作の結果を適用する
    ///
    /// 現在の保留状態のトークンと一致しない結果は破棄する。
    pub fn complete(&mut self, completion: Completion) {
        if !completion.awaited_by(&self.state) {
            debug!(
                token = %completion.token(),
                state = self.state.name(),
                "dropping stale response"
            );
            return;
        }

        match completion {
            Completion::Metadata { result, .. } => match result {
                Ok(mut metadata) => {
                    if metadata.thumbnail_url.is_empty() {
                        if let Some(request) = &self.request {
                            metadata.thumbnail_url = request.video_id().fallback_thumbnail_url();
                        }
                    }
                    info!(title = %metadata.title, "metadata received");
                    self.metadata = Some(metadata);
                    self.state = WorkflowState::AwaitingConfirmation;
                }
                Err(failure) => self.fail(failure),
            },
            Completion::Conversion { result, .. } => match result {
                Ok(handle) => {
                    info!(url = %handle.url, "conversion ready");
                    self.progress.complete();
                    self.handle = Some(handle);
                    self.state = WorkflowState::Ready;
                }
                Err(failure) => self.fail(failure),
            },
            Completion::Download { result, .. } => match result {
                Ok(path) => {
                    info!(path = %path.display(), "download saved");
                    self.saved_path = Some(path);
                    self.state = WorkflowState::Ready;
                }
                // 保存の失敗はすべてDOWNLOAD_FAILEDとして扱い、ハンドルを残す
                Err(failure) => self.enter_error(ServiceFailure {
                    kind: ErrorKind::DownloadFailed,
                    ..failure
                }),
            },
        }

        self.publish();
    }

    /// 擬似進捗を1ティック進める
    ///
    /// 指定トークンの変換中でない場合、または上限に達している場合は何もしない。
    pub fn tick_progress(&mut self, token: RequestToken) -> bool {
        if self.converting_token() != Some(token) {
            return false;
        }

        let advanced = self.progress.advance();
        if advanced {
            self.publish();
        }
        advanced
    }

    fn accepts_input(&self) -> bool {
        matches!(self.state, WorkflowState::Idle | WorkflowState::Error { .. })
    }

    fn build_request(&self, raw_url: &str) -> Result<ConversionRequest, DomainError> {
        let video_id = validator::validate(raw_url)?;
        let source_url = validator::source_url_for(raw_url, &video_id);
        ConversionRequest::new(source_url, video_id, self.format, self.quality)
    }

    fn begin_conversion(&mut self, request: ConversionRequest) -> Effect {
        let token = self.issue_token();
        self.progress.clear();
        self.request = Some(request.clone());
        self.state = WorkflowState::Converting { token };
        info!(
            %token,
            video_id = %request.video_id(),
            format = %request.format(),
            "conversion requested"
        );
        self.publish();

        Effect::Convert { token, request }
    }

    /// 変換結果を破棄してエラー状態へ移る
    fn fail(&mut self, failure: ServiceFailure) {
        self.progress.clear();
        self.handle = None;
        self.enter_error(failure);
    }

    /// 変換結果を保持したままエラー状態へ移る（保存失敗時）
    fn enter_error(&mut self, failure: ServiceFailure) {
        debug_assert!(
            !failure.kind.is_validation(),
            "validation errors are reported inline"
        );
        warn!(kind = %failure.kind, "workflow failed: {}", failure.message);
        self.state = WorkflowState::Error {
            kind: failure.kind,
            message: failure.message,
        };
    }

    /// 受け付けない操作: 状態は変えず、通知付きのスナップショットを1回送る
    fn reject(&mut self, intent: &'static str, notice: &str) {
        debug!(state = self.state.name(), intent, "intent rejected: {}", notice);
        let mut snapshot = self.snapshot();
        snapshot.notice = Some(notice.to_string());
        self.sink.publish(&snapshot);
    }

    fn issue_token(&mut self) -> RequestToken {
        self.last_token = self.last_token.next();
        self.last_token
    }

    fn output_file_name(&self) -> String {
        let (video_id, format, quality) = match &self.request {
            Some(request) => (
                request.video_id().as_str(),
                request.format(),
                request.quality(),
            ),
            None => ("download", self.format, self.quality),
        };
        let stem = self
            .metadata
            .as_ref()
            .map(|m| m.title.as_str())
            .unwrap_or(video_id);

        formatter::output_file_name(stem, video_id, format, quality)
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.sink.publish(&snapshot);
    }
}
