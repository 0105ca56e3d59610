//! エラー深刻度と終了コード
//!
//! 終了コードの決定はプレゼンテーション層（main.rs）の関心だが、
//! 各層のエラー型が自分の深刻度を申告できるよう独立したモジュールに置く。
//! このモジュールは他のモジュールに依存しない。

use serde::Serialize;
use std::fmt;

/// エラーの深刻度と対応する終了コード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// ユーザーの入力エラー
    ///
    /// URLが空・形式が不正、画質が未選択など、入力を直せば解決する。
    ///
    /// **Exit Code: 1**
    UserError,

    /// 設定エラー
    ///
    /// config.tomlが壊れている、server_urlが不正など。
    ///
    /// **Exit Code: 2**
    ConfigError,

    /// システムエラー
    ///
    /// 変換サービスに接続できない、変換・保存に失敗したなど、
    /// 入力とは無関係な外部要因。
    ///
    /// **Exit Code: 3**
    SystemError,
}

impl ErrorSeverity {
    /// 対応する Unix 終了コードを返す
    pub fn exit_code(self) -> i32 {
        match self {
            Self::UserError => 1,
            Self::ConfigError => 2,
            Self::SystemError => 3,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserError => write!(f, "user error"),
            Self::ConfigError => write!(f, "configuration error"),
            Self::SystemError => write!(f, "system error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ErrorSeverity::UserError.exit_code(), 1);
        assert_eq!(ErrorSeverity::ConfigError.exit_code(), 2);
        assert_eq!(ErrorSeverity::SystemError.exit_code(), 3);
    }

    #[test]
    fn test_serialized_name() {
        assert_eq!(
            serde_json::to_value(ErrorSeverity::ConfigError).unwrap(),
            "config_error"
        );
    }
}
