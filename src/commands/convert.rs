use crate::commands::result::{CommandResult, ConvertResult};
use crate::config::UserConfig;
use crate::domain::media::{Format, Quality};
use crate::domain::state::WorkflowState;
use crate::domain::validator;
use crate::domain::workflow::{Intent, ServiceFailure};
use crate::presentation::{input, sink};
use crate::session::HttpSession;
use anyhow::{Context, Result, bail};
use tracing::{info, warn};

/// convertコマンドのオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub url: String,
    pub format: Format,
    /// 画質（VIDEOのみ有効、未指定なら最高画質）
    pub quality: Option<Quality>,
    /// プレビュー後の確認を省略する
    pub assume_yes: bool,
    /// 動画情報を取得せずに変換する
    pub no_preview: bool,
}

/// 変換コマンドを実行する
///
/// 送信 → (動画情報の確認) → 変換 → ダウンロード を1回だけ実行します。
/// 状態の変化はシンクが逐次表示し、最終結果を`CommandResult`として返します。
///
/// # 引数
/// * `options` - コマンドラインで指定されたオプション
/// * `machine_output` - 機械可読出力フラグ（状態をJSON Linesで出力）
///
/// # エラー
/// 入力検証エラーは`DomainError`、サービスの失敗は`ServiceFailure`として
/// エラーチェーンに含まれ、main.rsで終了コードが決まります。
pub async fn execute(options: ConvertOptions, machine_output: bool) -> Result<CommandResult> {
    // 設定やネットワークに触れる前に入力を検証する
    let video_id = validator::validate(&options.url).context("Invalid video URL")?;

    // ユーザー設定を読み込み（自動検証される）
    let user_config = UserConfig::load()
        .context("Failed to load user configuration. Please check your config.toml file.")?;

    let preview = user_config.preview && !options.no_preview;
    let mut session = HttpSession::from_config(
        &user_config,
        preview,
        sink::for_output(machine_output, false),
    )
    .context("Failed to create conversion client")?;

    session.apply(Intent::SelectFormat(options.format));
    match (options.format, options.quality) {
        (Format::Video, Some(quality)) => session.apply(Intent::SelectQuality(Some(quality))),
        (Format::Audio, Some(quality)) => {
            warn!(%quality, "quality is ignored for audio conversion");
        }
        _ => {}
    }

    session.apply(Intent::Submit(options.url.clone()));
    if let Some(error) = session.controller().input_error() {
        bail!("{}", error.message);
    }
    session.settle().await;
    ensure_not_failed(&session, "Failed to fetch video information")?;

    if session.controller().state() == &WorkflowState::AwaitingConfirmation {
        if !options.assume_yes && !input::confirm("Convert this video?")? {
            info!(%video_id, "conversion declined");
            session.apply(Intent::Reset);
            return Ok(CommandResult::Convert(ConvertResult {
                video_id: video_id.to_string(),
                format: options.format,
                quality: None,
                title: None,
                download_url: None,
                saved_path: None,
                cancelled: true,
            }));
        }
        session.apply(Intent::Confirm);
        session.settle().await;
    }
    ensure_not_failed(&session, "Failed to convert the video")?;

    session.apply(Intent::Download);
    session.settle().await;
    ensure_not_failed(&session, "Failed to save the converted file")?;

    let controller = session.controller();
    let request = controller
        .request()
        .context("Conversion finished without a request")?;

    Ok(CommandResult::Convert(ConvertResult {
        video_id: request.video_id().to_string(),
        format: request.format(),
        quality: request.quality(),
        title: controller.metadata().map(|m| m.title.clone()),
        download_url: controller.download_handle().map(|h| h.url.clone()),
        saved_path: controller.saved_path().cloned(),
        cancelled: false,
    }))
}

/// エラー状態であればサービスの失敗をエラーとして返す
fn ensure_not_failed(session: &HttpSession, context: &'static str) -> Result<()> {
    if let WorkflowState::Error { kind, message } = session.controller().state() {
        return Err(anyhow::Error::new(ServiceFailure::new(*kind, message.clone())).context(context));
    }
    Ok(())
}
