/// ロギングの初期化
///
/// ログはすべてstderrへ出力する（stdoutは`--machine`のJSON用）。
///
/// レベルの優先順位:
/// 1. 環境変数`RUST_LOG`
/// 2. `--verbose`（debug）
/// 3. ユーザー設定の`log_level`
/// 4. ビルド時のデフォルト
use crate::config::{APP_CONFIG, APP_NAME};
use std::io;
use tracing_subscriber::EnvFilter;

/// RUST_LOGが無い場合に使うフィルタ
///
/// 自クレートのみ指定レベルとし、依存クレート（reqwest/hyper）はwarnに抑える。
pub fn default_directive(config_level: Option<&str>, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        config_level.unwrap_or(APP_CONFIG.logging.default_level)
    };
    format!("warn,{}={}", APP_NAME, level.to_ascii_lowercase())
}

/// グローバルサブスクライバを設定する
///
/// 既に設定済みの場合は何もしない。
pub fn init(config_level: Option<&str>, verbose: bool) {
    let directive = default_directive(config_level, verbose);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(None, false), "warn,tubeconv=warn");
        assert_eq!(default_directive(Some("INFO"), false), "warn,tubeconv=info");
        assert_eq!(default_directive(Some("error"), true), "warn,tubeconv=debug");
    }
}
