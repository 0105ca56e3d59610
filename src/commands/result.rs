/// コマンド実行結果を表す型
///
/// 各コマンドはこの型を返し、プレゼンテーション層（main.rs/cli.rs）で
/// 人間向けと機械向けの出力フォーマットを決定する。
use crate::domain::media::{Format, Quality, VideoMetadata};
use serde::Serialize;
use std::path::PathBuf;

/// コマンド実行結果の統一型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Convert(ConvertResult),
    Info(InfoResult),
    Shell(ShellResult),
    Help,
}

/// 変換コマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    pub video_id: String,
    pub format: Format,
    /// 画質（AUDIOでは常にNone）
    pub quality: Option<Quality>,
    /// 動画タイトル（プレビューが有効な場合のみ）
    pub title: Option<String>,
    /// 変換済みファイルのURL
    pub download_url: Option<String>,
    /// 保存先パス
    pub saved_path: Option<PathBuf>,
    /// 確認プロンプトで中止されたか
    pub cancelled: bool,
}

/// 動画情報コマンドの結果
#[derive(Debug, Clone, Serialize)]
pub struct InfoResult {
    pub video_id: String,
    pub source_url: String,
    #[serde(flatten)]
    pub metadata: VideoMetadata,
}

/// 対話シェルの結果
#[derive(Debug, Clone, Serialize)]
pub struct ShellResult {
    /// 終了時のワークフロー状態
    pub final_state: &'static str,
    /// 最後に保存したファイル
    pub last_saved_path: Option<PathBuf>,
}
