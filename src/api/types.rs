/// API通信用の型定義
///
/// 変換サービスのリクエスト/レスポンスをシリアライズ・デシリアライズするための
/// 構造体を定義します。旧バージョンのサーバーが返すフィールド名も受け付けます。
use crate::domain::media::{ConversionRequest, VideoMetadata};
use serde::{Deserialize, Serialize};

/// 動画情報レスポンス
///
/// GET /info のレスポンス型
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// サーバー側で取得に成功したか（省略時は成功扱い）
    #[serde(default = "default_success")]
    pub success: bool,

    #[serde(default, alias = "titulo")]
    pub title: String,

    #[serde(default, alias = "canal")]
    pub channel: String,

    /// 再生時間（秒）
    #[serde(default, alias = "duracion")]
    pub duration_seconds: u64,

    #[serde(default, alias = "views")]
    pub view_count: u64,

    #[serde(default, alias = "thumbnail")]
    pub thumbnail_url: Option<String>,

    /// 失敗時のメッセージ
    #[serde(default, alias = "detail")]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl InfoResponse {
    /// ドメインのメタデータへ変換
    ///
    /// サムネイルが無い場合は空文字列のまま返す（代替URLはワークフロー側で補う）。
    pub fn into_metadata(self) -> VideoMetadata {
        VideoMetadata {
            title: self.title,
            channel: self.channel,
            duration_seconds: self.duration_seconds,
            view_count: self.view_count,
            thumbnail_url: self.thumbnail_url.unwrap_or_default(),
        }
    }
}

/// 変換リクエストボディ
///
/// POST /convert のリクエスト型
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequestBody<'a> {
    pub url: &'a str,
    pub video_id: &'a str,
    pub format: &'static str,
    /// 画質レベル（1..5、AUDIOでは省略）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl<'a> From<&'a ConversionRequest> for ConvertRequestBody<'a> {
    fn from(request: &'a ConversionRequest) -> Self {
        Self {
            url: request.source_url(),
            video_id: request.video_id().as_str(),
            format: request.format().as_str(),
            quality: request.quality().map(|q| q.level()),
        }
    }
}

/// 変換レスポンス
///
/// POST /convert のレスポンス型
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertResponse {
    /// 変換済みファイルのURL（相対パスの場合あり）
    #[serde(rename = "downloadUrl", alias = "download_url")]
    pub download_url: String,
}

/// エラーレスポンス
///
/// 非2xx応答のボディ（`{ "error": ... }` または `{ "detail": ... }`）
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "detail")]
    pub error: String,
}

impl ErrorBody {
    /// ボディからエラーメッセージを取り出す
    ///
    /// JSONでない場合は空でない本文をそのまま使う。
    pub fn message_from(body: &str) -> Option<String> {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return Some(parsed.error);
        }
        let trimmed = body.trim();
        (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::{Format, Quality, VideoId};

    #[test]
    fn test_info_response_deserialization() {
        let json = r#"{
            "success": true,
            "title": "Never Gonna Give You Up",
            "channel": "Rick Astley",
            "durationSeconds": 212,
            "viewCount": 1500000000,
            "thumbnailUrl": "https://img/x.jpg"
        }"#;

        let response: InfoResponse = serde_json::from_str(json).expect("Failed to parse");
        assert!(response.success);
        let metadata = response.into_metadata();
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.duration_seconds, 212);
        assert_eq!(metadata.view_count, 1_500_000_000);
        assert_eq!(metadata.thumbnail_url, "https://img/x.jpg");
    }

    #[test]
    fn test_info_response_legacy_fields() {
        let json = r#"{
            "success": true,
            "titulo": "Cancion",
            "canal": "Canal",
            "duracion": 61,
            "views": 42,
            "thumbnail": "t.jpg"
        }"#;

        let metadata = serde_json::from_str::<InfoResponse>(json)
            .expect("Failed to parse")
            .into_metadata();
        assert_eq!(metadata.title, "Cancion");
        assert_eq!(metadata.channel, "Canal");
        assert_eq!(metadata.duration_seconds, 61);
        assert_eq!(metadata.view_count, 42);
        assert_eq!(metadata.thumbnail_url, "t.jpg");
    }

    #[test]
    fn test_info_response_failure() {
        let json = r#"{ "success": false, "error": "Video unavailable" }"#;
        let response: InfoResponse = serde_json::from_str(json).expect("Failed to parse");
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Video unavailable"));
        assert!(response.into_metadata().thumbnail_url.is_empty());
    }

    #[test]
    fn test_convert_body_serialization() {
        let id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let request =
            ConversionRequest::new("https://youtu.be/dQw4w9WgXcQ", id.clone(), Format::Video, Some(Quality::P720))
                .unwrap();
        let json = serde_json::to_value(ConvertRequestBody::from(&request)).unwrap();
        assert_eq!(json["url"], "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(json["videoId"], "dQw4w9WgXcQ");
        assert_eq!(json["format"], "video");
        assert_eq!(json["quality"], 3);

        let audio = ConversionRequest::new("u", id, Format::Audio, None).unwrap();
        let json = serde_json::to_value(ConvertRequestBody::from(&audio)).unwrap();
        assert!(json.get("quality").is_none());
    }

    #[test]
    fn test_convert_response_aliases() {
        let camel: ConvertResponse = serde_json::from_str(r#"{"downloadUrl":"/f/a.mp3"}"#).unwrap();
        let snake: ConvertResponse = serde_json::from_str(r#"{"download_url":"/f/a.mp3"}"#).unwrap();
        assert_eq!(camel.download_url, snake.download_url);
    }

    #[test]
    fn test_error_body_message() {
        assert_eq!(
            ErrorBody::message_from(r#"{"error":"quality unavailable"}"#).as_deref(),
            Some("quality unavailable")
        );
        assert_eq!(
            ErrorBody::message_from(r#"{"detail":"bad id"}"#).as_deref(),
            Some("bad id")
        );
        assert_eq!(
            ErrorBody::message_from("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        assert_eq!(ErrorBody::message_from(""), None);
        assert_eq!(ErrorBody::message_from(r#"{"other":1}"#), None);
    }
}
