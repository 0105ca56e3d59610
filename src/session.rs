/// アプリケーション層: ワークフローセッション
///
/// `WorkflowController`を所有する単一のイベントループ。
/// コントローラが返した`Effect`をtokioタスクとして実行し、
/// 結果をチャネル経由で`Completion`として戻す。
///
/// 擬似進捗のタイマーは変換中（同じトークンの間）だけ存在し、
/// 変換状態を抜けた時点で破棄される。
use crate::api::client::ApiClient;
use crate::api::conversion::{ConversionService, HttpConversionClient};
use crate::api::error::InfraError;
use crate::config::{APP_CONFIG, UserConfig};
use crate::domain::progress::ProgressPolicy;
use crate::domain::state::RequestToken;
use crate::domain::workflow::{
    Completion, Effect, Intent, PresentationSink, ServiceFailure, WorkflowController,
    WorkflowOptions,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, trace};

/// 実際の変換サービスに接続するセッション
pub type HttpSession = Session<HttpConversionClient, Box<dyn PresentationSink>>;

pub struct Session<C, K> {
    controller: WorkflowController<K>,
    service: C,
    output_dir: PathBuf,
    tick: Duration,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    ticker: Option<(RequestToken, Interval)>,
}

impl<C, K> Session<C, K>
where
    C: ConversionService + Clone + Send + Sync + 'static,
    K: PresentationSink,
{
    /// # Arguments
    /// * `output_dir` - ダウンロードしたファイルの保存先
    /// * `tick` - 擬似進捗を進める間隔
    pub fn new(
        controller: WorkflowController<K>,
        service: C,
        output_dir: PathBuf,
        tick: Duration,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            service,
            output_dir,
            tick,
            completions_tx,
            completions_rx,
            ticker: None,
        }
    }

    pub fn controller(&self) -> &WorkflowController<K> {
        &self.controller
    }

    /// ユーザー操作を適用し、必要なネットワーク操作を開始する
    pub fn apply(&mut self, intent: Intent) {
        if let Some(effect) = self.controller.handle_intent(intent) {
            self.spawn(effect);
        }
        self.sync_ticker();
    }

    /// 進行中の操作が終わるまで結果とタイマーを処理する
    pub async fn settle(&mut self) {
        while self.controller.state().is_busy() {
            tokio::select! {
                Some(completion) = self.completions_rx.recv() => self.on_completion(completion),
                token = next_tick(&mut self.ticker) => self.on_tick(token),
            }
        }
    }

    /// 対話セッション: 操作・結果・タイマーを並行して処理する
    ///
    /// 操作チャネルが閉じると終了する。処理中の操作はキャンセルされない。
    pub async fn run(&mut self, mut intents: mpsc::Receiver<Intent>) {
        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => self.apply(intent),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => self.on_completion(completion),
                token = next_tick(&mut self.ticker) => self.on_tick(token),
            }
        }
        debug!("session input closed");
    }

    fn spawn(&mut self, effect: Effect) {
        let service = self.service.clone();
        let tx = self.completions_tx.clone();

        match effect {
            Effect::FetchMetadata { token, video_id } => {
                tokio::spawn(async move {
                    let result = service
                        .fetch_metadata(&video_id)
                        .await
                        .map_err(ServiceFailure::from);
                    send(&tx, Completion::Metadata { token, result });
                });
            }
            Effect::Convert { token, request } => {
                tokio::spawn(async move {
                    let result = service
                        .request_conversion(&request)
                        .await
                        .map_err(ServiceFailure::from);
                    send(&tx, Completion::Conversion { token, result });
                });
            }
            Effect::Download {
                token,
                handle,
                file_name,
            } => {
                let destination = self.output_dir.join(file_name);
                tokio::spawn(async move {
                    let result = service
                        .download(&handle, &destination)
                        .await
                        .map_err(ServiceFailure::from);
                    send(&tx, Completion::Download { token, result });
                });
            }
        }
    }

    fn on_completion(&mut self, completion: Completion) {
        self.controller.complete(completion);
        self.sync_ticker();
    }

    fn on_tick(&mut self, token: RequestToken) {
        if self.controller.tick_progress(token) {
            trace!(%token, percent = self.controller.progress(), "progress advanced");
        }
    }

    /// タイマーを現在の変換トークンに合わせる
    fn sync_ticker(&mut self) {
        let converting = self.controller.converting_token();
        let current = self.ticker.as_ref().map(|(token, _)| *token);
        if converting == current {
            return;
        }

        self.ticker = converting.map(|token| {
            let mut interval = interval_at(Instant::now() + self.tick, self.tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(%token, "progress timer started");
            (token, interval)
        });
    }
}

impl HttpSession {
    /// ユーザー設定からセッションを組み立てる
    ///
    /// # Arguments
    /// * `preview` - 変換前に動画情報を確認するか（`--no-preview`で上書きされた値）
    pub fn from_config(
        config: &UserConfig,
        preview: bool,
        sink: Box<dyn PresentationSink>,
    ) -> Result<Self, InfraError> {
        let api = ApiClient::new(config.server_url())?;
        debug!(server = api.base_url(), "using conversion service");
        let service = HttpConversionClient::new(api, config.mode);
        let options = WorkflowOptions {
            preview_metadata: preview,
            progress: ProgressPolicy::new(APP_CONFIG.progress.step, APP_CONFIG.progress.ceiling),
        };
        let output_dir = config.output_dir();
        debug!(
            mode = %service.mode(),
            output_dir = %output_dir.display(),
            preview,
            "session configured"
        );

        Ok(Self::new(
            WorkflowController::new(options, sink),
            service,
            output_dir,
            Duration::from_millis(APP_CONFIG.progress.tick_millis),
        ))
    }
}

fn send(tx: &mpsc::UnboundedSender<Completion>, completion: Completion) {
    if tx.send(completion).is_err() {
        debug!("session closed before completion was delivered");
    }
}

/// タイマーが存在すれば次のティックを待つ（なければ永久に待つ）
async fn next_tick(ticker: &mut Option<(RequestToken, Interval)>) -> RequestToken {
    match ticker {
        Some((token, interval)) => {
            interval.tick().await;
            *token
        }
        None => std::future::pending().await,
    }
}
