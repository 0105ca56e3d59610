/// 設定管理モジュール
///
/// このモジュールは2層の設定構造を提供します:
/// 1. AppConfig - コンパイル時定数として定義される静的設定（APP_CONFIG）
/// 2. UserConfig - 実行時に読み込まれる動的設定
///
/// # 使用例
///
/// ```rust,ignore
/// use crate::config::{APP_CONFIG, UserConfig};
///
/// // AppConfig: グローバル定数として直接参照
/// let tick = APP_CONFIG.progress.tick_millis;
///
/// // UserConfig: load時に自動検証
/// let user_config = UserConfig::load()?;
/// let base_url = user_config.server_url();
/// ```
pub mod app;
pub mod error;
pub mod user;

pub use app::{APP_CONFIG, APP_NAME};
pub use user::{ConversionMode, UserConfig};
