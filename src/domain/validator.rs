/// ドメインサービス: URLバリデーション
///
/// ユーザーが入力した動画URLを検証し、動画IDを抽出する。
/// 純粋関数であり副作用を持たない。
///
/// 受け付ける形式:
/// - 11文字の動画ID単体（`[A-Za-z0-9_-]{11}`）
/// - `youtube.com/watch?v=ID`, `youtube.com/embed/ID`, `youtube.com/v/ID`
/// - `youtu.be/ID`
///
/// スキーム（http/https）と`www.`は省略可能。ホストが存在する場合は
/// 許可されたホストと一致しなければならない。
use crate::domain::error::DomainError;
use crate::domain::media::VideoId;
use regex::Regex;
use std::sync::OnceLock;

static RE_BARE_ID: OnceLock<Regex> = OnceLock::new();
static RE_YOUTUBE: OnceLock<Regex> = OnceLock::new();
static RE_SHORT: OnceLock<Regex> = OnceLock::new();

fn re_bare_id() -> &'static Regex {
    RE_BARE_ID.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("compile RE_BARE_ID"))
}

fn re_youtube() -> &'static Regex {
    RE_YOUTUBE.get_or_init(|| {
        Regex::new(
            r"^(?i:(?:https?://)?(?:www\.)?youtube\.com/)(?:watch\?v=|embed/|v/)([A-Za-z0-9_-]{11})(?:[&?#/].*)?$",
        )
        .expect("compile RE_YOUTUBE")
    })
}

fn re_short() -> &'static Regex {
    RE_SHORT.get_or_init(|| {
        Regex::new(r"^(?i:(?:https?://)?youtu\.be/)([A-Za-z0-9_-]{11})(?:[&?#/].*)?$")
            .expect("compile RE_SHORT")
    })
}

/// 入力URLを検証して動画IDを返す
///
/// # エラー
/// - 空文字列（空白のみ） → `DomainError::EmptyUrl`
/// - いずれの形式にも一致しない → `DomainError::InvalidUrl`
pub fn validate(raw_url: &str) -> Result<VideoId, DomainError> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyUrl);
    }

    if re_bare_id().is_match(trimmed) {
        return VideoId::parse(trimmed).ok_or_else(|| DomainError::invalid_url(trimmed));
    }

    [re_youtube(), re_short()]
        .iter()
        .find_map(|re| re.captures(trimmed))
        .and_then(|caps| caps.get(1))
        .and_then(|m| VideoId::parse(m.as_str()))
        .ok_or_else(|| DomainError::invalid_url(trimmed))
}

/// 検証済みの入力からリクエストに使うソースURLを決定する
///
/// 動画ID単体が入力された場合は正規化された視聴URLを返す。
pub fn source_url_for(raw_url: &str, video_id: &VideoId) -> String {
    let trimmed = raw_url.trim();
    if trimmed == video_id.as_str() {
        video_id.canonical_url()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(input: &str) -> String {
        validate(input)
            .unwrap_or_else(|e| panic!("{input:?} should be valid: {e}"))
            .as_str()
            .to_string()
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("http://youtube.com/watch?v=dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("youtube.com/embed/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("www.youtube.com/v/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("youtu.be/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_trailing_parameters_allowed() {
        assert_eq!(
            id_of("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(id_of("https://youtu.be/dQw4w9WgXcQ?si=abc"), "dQw4w9WgXcQ");
        assert_eq!(id_of("https://www.youtube.com/embed/dQw4w9WgXcQ#t=3"), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_scheme_and_host_ignore_case() {
        assert_eq!(
            id_of("HTTPS://WWW.YouTube.com/watch?v=dQw4w9WgXcQ"),
            "dQw4w9WgXcQ"
        );
        assert_eq!(id_of("Https://YOUTU.BE/dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        // 動画IDの大文字小文字は区別したまま
        assert_ne!(
            id_of("https://www.youtube.com/watch?v=DQW4W9WGXCQ"),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_bare_id_and_whitespace() {
        assert_eq!(id_of("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(id_of("  dQw4w9WgXcQ\n"), "dQw4w9WgXcQ");
        assert_eq!(
            id_of("\t https://www.youtube.com/watch?v=dQw4w9WgXcQ  "),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(validate(""), Err(DomainError::EmptyUrl));
        assert_eq!(validate("   \t\n"), Err(DomainError::EmptyUrl));
    }

    #[test]
    fn test_invalid_inputs() {
        let rejected = [
            "not a url",
            "https://vimeo.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=short",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQextra",
            "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com.evil.com/watch?v=dQw4w9WgXcQ",
            "ftp://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/playlist?list=PL123",
            "dQw4w9WgXc",
            "dQw4w9WgXcQQ",
        ];
        for input in rejected {
            assert!(
                matches!(validate(input), Err(DomainError::InvalidUrl { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_url_keeps_trimmed_input() {
        match validate("  not a url  ") {
            Err(DomainError::InvalidUrl { input }) => assert_eq!(input, "not a url"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_source_url_for_bare_id() {
        let id = validate(" dQw4w9WgXcQ ").unwrap();
        assert_eq!(
            source_url_for(" dQw4w9WgXcQ ", &id),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            source_url_for("https://youtu.be/dQw4w9WgXcQ ", &id),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }
}
