/// ユーザー設定モジュール
///
/// 実行時にユーザーディレクトリから読み込まれる動的設定を管理します。
/// Windows: C:\Users\<User>\AppData\Roaming\tubeconv\config.toml
/// macOS:   /Users/<User>/Library/Application Support/tubeconv/config.toml
/// Linux:   /home/<user>/.config/tubeconv/config.toml
///
/// 初回起動時にデフォルト値から自動的にconfig.tomlを作成します。
use crate::config::app::{APP_CONFIG, APP_NAME};
use crate::config::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// 受け付けるログレベル
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 変換リクエストの送り方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// リクエストから直接ダウンロードURLを組み立てる（往復なし）
    Direct,
    /// POST /convert で変換済みファイルのURLを受け取る
    #[default]
    Server,
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Server => f.write_str("server"),
        }
    }
}

/// ユーザー設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// 変換サービスのベースURL（未設定時はデフォルトのエンドポイント）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    #[serde(default)]
    pub mode: ConversionMode,

    /// 変換前に動画情報を表示して確認を求めるか
    #[serde(default = "default_preview")]
    pub preview: bool,

    /// 保存先ディレクトリ（未設定時はダウンロードフォルダ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// ログレベル（RUST_LOGが優先）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

// プライベート関数（serde用）
fn default_preview() -> bool {
    true
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            mode: ConversionMode::default(),
            preview: default_preview(),
            output_dir: None,
            log_level: None,
        }
    }
}

impl UserConfig {
    /// ユーザー設定ファイルのパスを取得
    ///
    /// # Errors
    /// 設定ディレクトリが取得できない場合に ConfigError::DirectoryNotFound を返します。
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .ok_or_else(|| ConfigError::directory_not_found("Failed to get user config directory"))
            .map(|config_dir| config_dir.join(APP_NAME).join("config.toml"))
    }

    /// ユーザー設定を読み込む
    ///
    /// 設定ファイルが存在しない場合は、デフォルトテンプレートから自動的に作成します。
    /// 読み込み後、自動的に検証を実行します（Fail Fast）。
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスからユーザー設定を読み込む
    ///
    /// # Errors
    /// 設定ファイルの読み込み、パース、または検証に失敗した場合に ConfigError を返します。
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to read config file: {}", config_path.display()),
                e,
            )
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ConfigError::parse_error(
                format!("Failed to parse config file ({})", config_path.display()),
                e,
            )
        })?;

        // 自動検証（Fail Fast）
        config.validate()?;

        Ok(config)
    }

    /// デフォルト設定ファイルを作成
    fn create_default_config(config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent(config_path)?;

        fs::write(config_path, Self::default_toml_content()).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to create default config file: {}", config_path.display()),
                e,
            )
        })?;

        Ok(())
    }

    /// デフォルトTOML設定を生成
    ///
    /// 任意項目はコメントとして記載し、値はDefault実装と一致させる。
    fn default_toml_content() -> String {
        let defaults = Self::default();
        format!(
            r#"# tubeconv - User Configuration

# Conversion service base URL (default: {endpoint})
# server_url = "{endpoint}"

# How conversions are requested:
#   "server" - POST /convert and download the returned file
#   "direct" - download straight from /download/<format>
mode = "{mode}"

# Show video information and ask for confirmation before converting
preview = {preview}

# Where downloaded files are saved (default: your Downloads folder)
# output_dir = "/path/to/dir"

# Log level: trace, debug, info, warn, error (RUST_LOG takes precedence)
# log_level = "info"
"#,
            endpoint = APP_CONFIG.api.endpoint,
            mode = defaults.mode,
            preview = defaults.preview,
        )
    }

    /// 指定パスへユーザー設定を保存する
    ///
    /// 必要に応じて設定ディレクトリを作成します。
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        Self::ensure_parent(config_path)?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::serialize_error("Failed to serialize config", e))?;

        fs::write(config_path, content).map_err(|e| {
            ConfigError::file_system(
                format!("Failed to write config file: {}", config_path.display()),
                e,
            )
        })?;

        Ok(())
    }

    fn ensure_parent(config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::file_system(
                    format!("Failed to create config directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// ユーザー設定を検証
    ///
    /// # 検証内容
    /// - server_url: http:// または https:// で始まること
    /// - log_level: trace/debug/info/warn/error のいずれか
    ///
    /// # Errors
    /// 検証に失敗した場合に ConfigError::ValidationError を返します。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::validation_error(format!(
                    "Invalid server_url '{}'. It must start with http:// or https://",
                    url
                )));
            }
        }

        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::validation_error(format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        Ok(())
    }

    /// 使用する変換サービスのベースURL
    pub fn server_url(&self) -> &str {
        self.server_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(APP_CONFIG.api.endpoint)
    }

    /// 保存先ディレクトリ
    ///
    /// 未設定時はダウンロードフォルダ、取得できなければカレントディレクトリ。
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_path() -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.toml");
        (dir, path)
    }

    #[test]
    fn test_config_path() {
        let path = UserConfig::config_path().expect("Failed to get config path");
        assert!(path.to_string_lossy().contains("tubeconv"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_load_creates_default_if_not_exists() {
        let (_dir, path) = temp_path();

        let config = UserConfig::load_from(&path).expect("Default config should load");

        assert!(path.exists(), "Config file should be created");
        assert_eq!(config, UserConfig::default());

        let content = fs::read_to_string(&path).expect("Failed to read config");
        assert!(content.contains("mode = \"server\""));
        assert!(content.contains("preview = true"));
        assert!(content.contains("# server_url"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, path) = temp_path();
        let config = UserConfig {
            server_url: Some("https://convert.example.com".to_string()),
            mode: ConversionMode::Direct,
            preview: false,
            output_dir: Some(PathBuf::from("/tmp/media")),
            log_level: Some("debug".to_string()),
        };

        config.save_to(&path).expect("Failed to save config");
        let loaded = UserConfig::load_from(&path).expect("Failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let (_dir, path) = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "mode = \"direct\"\n").unwrap();

        let config = UserConfig::load_from(&path).unwrap();
        assert_eq!(config.mode, ConversionMode::Direct);
        assert!(config.preview);
        assert_eq!(config.server_url(), APP_CONFIG.api.endpoint);
    }

    #[test]
    fn test_load_rejects_invalid_server_url() {
        let (_dir, path) = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "server_url = \"ftp://example.com\"\n").unwrap();

        match UserConfig::load_from(&path) {
            Err(ConfigError::ValidationError { message }) => assert!(message.contains("server_url")),
            other => panic!("Expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_corrupted_file() {
        let (_dir, path) = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "mode = [").unwrap();

        assert!(matches!(
            UserConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = UserConfig {
            log_level: Some("INFO".to_string()),
            ..UserConfig::default()
        };
        assert!(config.validate().is_ok());

        config.log_level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_dir_override() {
        let config = UserConfig {
            output_dir: Some(PathBuf::from("/srv/out")),
            ..UserConfig::default()
        };
        assert_eq!(config.output_dir(), PathBuf::from("/srv/out"));
    }
}
