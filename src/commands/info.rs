use crate::api::client::ApiClient;
use crate::api::conversion::{ConversionService, HttpConversionClient};
use crate::commands::result::{CommandResult, InfoResult};
use crate::config::UserConfig;
use crate::domain::validator;
use anyhow::{Context, Result};

/// 動画情報を表示するコマンドを実行する
///
/// 変換は行わず、変換サービスから動画情報のみを取得します。
///
/// # 引数
/// * `url` - 動画URLまたは動画ID
pub async fn execute(url: &str) -> Result<CommandResult> {
    let user_config = UserConfig::load()
        .context("Failed to load user configuration. Please check your config.toml file.")?;

    let video_id = validator::validate(url).context("Invalid video URL")?;

    let client = ApiClient::new(user_config.server_url()).context("Failed to create API client")?;
    let service = HttpConversionClient::new(client, user_config.mode);

    let mut metadata = service
        .fetch_metadata(&video_id)
        .await
        .context("Failed to fetch video information")?;

    if metadata.thumbnail_url.is_empty() {
        metadata.thumbnail_url = video_id.fallback_thumbnail_url();
    }

    Ok(CommandResult::Info(InfoResult {
        video_id: video_id.to_string(),
        source_url: validator::source_url_for(url, &video_id),
        metadata,
    }))
}
