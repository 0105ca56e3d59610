mod api;
mod cli;
mod commands;
mod config;
mod domain;
mod error_severity;
mod logging;
mod presentation;
mod session;

use anyhow::Result;
use api::error::InfraError;
use cli::GlobalFlags;
use config::UserConfig;
use config::error::ConfigError;
use domain::error::DomainError;
use domain::workflow::ServiceFailure;
use error_severity::ErrorSeverity;
use std::env;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let (flags, command_args) = cli::split_global_flags(&args);

    // 設定の読み込みに失敗してもログは初期化し、エラーはコマンド側で報告する
    let log_level = UserConfig::load().ok().and_then(|c| c.log_level);
    logging::init(log_level.as_deref(), flags.verbose);

    if let Err(e) = run(&command_args, flags).await {
        handle_error(e, flags.machine);
    }
}

/// アプリケーションのメイン処理
async fn run(args: &[String], flags: GlobalFlags) -> Result<()> {
    let result = cli::run(args, flags.machine).await?;
    presentation::output::output_result(&result, flags.machine)
}

/// エラーハンドリングとユーザーへの表示
///
/// anyhow::Error から元のエラー型を downcast して、
/// エラーの種類に応じた exit code とメッセージを決定する。
fn handle_error(error: anyhow::Error, machine_output: bool) {
    let severity = determine_severity(&error);
    let exit_code = severity.map_or(1, ErrorSeverity::exit_code);
    let hint = get_error_hint(&error);

    if machine_output {
        // 機械可読JSON（stdout）
        let json = serde_json::json!({
            "success": false,
            "error": error.to_string(),
            "causes": error.chain().skip(1).map(|c| c.to_string()).collect::<Vec<_>>(),
            "error_type": severity,
            "exit_code": exit_code,
            "hint": hint,
        });
        println!("{}", json);
    } else {
        eprintln!("Error: {}", error);

        // エラーチェーンを辿って詳細を表示
        let chain: Vec<_> = error.chain().skip(1).collect();
        if !chain.is_empty() {
            eprintln!("\nCaused by:");
            for (i, cause) in chain.iter().enumerate() {
                eprintln!("  {}: {}", i + 1, cause);
            }
        }

        if let Some(hint) = &hint {
            eprintln!("\nHint: {}", hint);
        }
    }

    std::process::exit(exit_code);
}

/// エラーチェーンから深刻度を決定
fn determine_severity(error: &anyhow::Error) -> Option<ErrorSeverity> {
    for cause in error.chain() {
        if let Some(domain_err) = cause.downcast_ref::<DomainError>() {
            return Some(domain_err.severity());
        }
        if let Some(infra_err) = cause.downcast_ref::<InfraError>() {
            return Some(infra_err.severity());
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return Some(config_err.severity());
        }
        if let Some(failure) = cause.downcast_ref::<ServiceFailure>() {
            return Some(failure.severity());
        }
    }

    None
}

/// エラーに対するユーザー向けヒントを取得
fn get_error_hint(error: &anyhow::Error) -> Option<String> {
    for cause in error.chain() {
        let hint = if let Some(domain_err) = cause.downcast_ref::<DomainError>() {
            domain_err.hint()
        } else if let Some(infra_err) = cause.downcast_ref::<InfraError>() {
            infra_err.hint()
        } else if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            config_err.hint()
        } else if let Some(failure) = cause.downcast_ref::<ServiceFailure>() {
            failure.hint()
        } else {
            None
        };

        if let Some(hint) = hint {
            return Some(hint.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use anyhow::Context;

    #[test]
    fn test_domain_error_is_user_error() {
        let error = anyhow::Error::new(DomainError::EmptyUrl).context("Invalid video URL");
        assert_eq!(determine_severity(&error), Some(ErrorSeverity::UserError));
        assert!(get_error_hint(&error).is_some());
    }

    #[test]
    fn test_service_failure_is_system_error_with_hint() {
        let error = anyhow::Error::new(ServiceFailure::new(ErrorKind::NetworkError, "offline"))
            .context("Failed to convert the video");
        assert_eq!(determine_severity(&error), Some(ErrorSeverity::SystemError));
        assert!(get_error_hint(&error).unwrap().contains("server_url"));
    }

    #[test]
    fn test_config_error_is_config_error() {
        let result: Result<()> = Err(ConfigError::validation_error("bad server_url"))
            .context("Failed to load user configuration");
        let error = result.unwrap_err();
        assert_eq!(determine_severity(&error), Some(ErrorSeverity::ConfigError));
    }

    #[test]
    fn test_unknown_error_has_no_severity() {
        let error = anyhow::anyhow!("Unknown command");
        assert_eq!(determine_severity(&error), None);
        assert_eq!(get_error_hint(&error), None);
    }
}
