/// ドメインモデル: 変換リクエストと関連する値型
///
/// 動画ID、出力形式、画質、変換リクエスト、動画メタデータ、
/// ダウンロードハンドルを定義します。
use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 11文字の動画ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// 動画IDの長さ
    pub const LEN: usize = 11;

    /// 文字列が動画IDとして妥当な場合のみ生成する
    pub fn parse(value: &str) -> Option<Self> {
        let valid = value.len() == Self::LEN
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 正規化された視聴URL
    pub fn canonical_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// サービスがサムネイルを返さなかった場合の代替URL
    pub fn fallback_thumbnail_url(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// 音声のみ（MP3）
    #[default]
    Audio,
    /// 映像+音声（MP4）
    Video,
}

impl Format {
    /// APIで使用する名前
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// 保存ファイルの拡張子
    pub fn extension(self) -> &'static str {
        match self {
            Self::Audio => "mp3",
            Self::Video => "mp4",
        }
    }

    /// ユーザー入力から形式を解釈する（"audio"/"mp3", "video"/"mp4"）
    pub fn from_input(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "audio" | "mp3" => Some(Self::Audio),
            "video" | "mp4" => Some(Self::Video),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画質（低い順の順序付き列挙、レベル1..5）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quality {
    P144,
    P360,
    P720,
    P1080,
    Max,
}

impl Quality {
    /// 低い順の全画質
    pub const ALL: [Quality; 5] = [
        Quality::P144,
        Quality::P360,
        Quality::P720,
        Quality::P1080,
        Quality::Max,
    ];

    /// 最高画質（VIDEO選択時のデフォルト）
    pub fn highest() -> Self {
        Self::Max
    }

    /// APIで使用するレベル番号（1..5）
    pub fn level(self) -> u8 {
        match self {
            Self::P144 => 1,
            Self::P360 => 2,
            Self::P720 => 3,
            Self::P1080 => 4,
            Self::Max => 5,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.level() == level)
    }

    /// 表示用ラベル
    pub fn label(self) -> &'static str {
        match self {
            Self::P144 => "144p",
            Self::P360 => "360p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Quality {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

/// 変換リクエスト
///
/// 送信時に生成され、変換クライアントに一度だけ渡される。
/// 生成後は変更不可。`quality`が`None`になり得るのは`Format::Audio`の場合のみ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    source_url: String,
    video_id: VideoId,
    format: Format,
    quality: Option<Quality>,
}

impl ConversionRequest {
    /// 変換リクエストを生成
    ///
    /// AUDIOの場合、渡された画質は無視される。
    ///
    /// # Errors
    /// VIDEOで画質が未選択の場合に`DomainError::MissingQuality`を返します。
    pub fn new(
        source_url: impl Into<String>,
        video_id: VideoId,
        format: Format,
        quality: Option<Quality>,
    ) -> Result<Self, DomainError> {
        let quality = match format {
            Format::Audio => None,
            Format::Video => Some(quality.ok_or(DomainError::MissingQuality)?),
        };

        Ok(Self {
            source_url: source_url.into(),
            video_id,
            format,
            quality,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn quality(&self) -> Option<Quality> {
        self.quality
    }
}

/// 動画メタデータ（プレビュー表示用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    pub duration_seconds: u64,
    pub view_count: u64,
    pub thumbnail_url: String,
}

/// 変換済みファイルへのロケータ
///
/// ダウンロードは冪等で、同じハンドルから何度でも実行できる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadHandle {
    pub url: String,
    pub format: Format,
}
