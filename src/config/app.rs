/// アプリケーション設定モジュール
///
/// コンパイル時定数として埋め込まれる静的設定を管理します。
/// これらの設定は実行時には変更できません（ユーザーが変更できる値は`UserConfig`）。

/// アプリケーション全体の設定
#[derive(Debug, Clone, Copy)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub progress: ProgressConfig,
    pub logging: LoggingConfig,
}

/// 変換サービス関連の設定
#[derive(Debug, Clone, Copy)]
pub struct ApiConfig {
    /// 変換サービスのデフォルトのベースURL
    pub endpoint: &'static str,

    /// APIリクエストのタイムアウト(秒)
    pub timeout_seconds: u64,

    /// ダウンロード（ファイル転送）のタイムアウト(秒)
    pub download_timeout_seconds: u64,
}

/// 擬似進捗の設定
#[derive(Debug, Clone, Copy)]
pub struct ProgressConfig {
    /// 進捗を進める間隔(ミリ秒)
    pub tick_millis: u64,

    /// 1ティックあたりの増分(%)
    pub step: u8,

    /// 完了前に表示できる上限(%)
    pub ceiling: u8,
}

/// ロギング関連の設定
#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    /// デフォルトのログレベル (trace, debug, info, warn, error)
    pub default_level: &'static str,
}

/// アプリケーション名（設定ディレクトリ名にも使用）
pub const APP_NAME: &str = "tubeconv";

/// グローバル設定
pub const APP_CONFIG: AppConfig = AppConfig {
    api: ApiConfig {
        endpoint: "http://127.0.0.1:8000",
        timeout_seconds: 120,
        download_timeout_seconds: 1800,
    },
    progress: ProgressConfig {
        tick_millis: 200,
        step: 10,
        ceiling: 95,
    },
    logging: LoggingConfig {
        default_level: "warn",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ceiling_below_completion() {
        assert!(APP_CONFIG.progress.ceiling < 100);
        assert!(APP_CONFIG.progress.step > 0);
    }

    #[test]
    fn test_default_endpoint() {
        assert_eq!(APP_CONFIG.api.endpoint, "http://127.0.0.1:8000");
        assert!(APP_CONFIG.api.timeout_seconds > 0);
    }
}
