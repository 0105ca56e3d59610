/// HTTPクライアント
///
/// 変換サービスとの通信を担当するHTTPクライアント。
/// タイムアウト、エラーハンドリング、URLの組み立てを含みます。
use crate::api::error::{InfraError, ServiceOperation};
use crate::api::types::ErrorBody;
use crate::config::APP_CONFIG;
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::debug;

/// APIクライアントの結果型
type ApiResult<T> = Result<T, InfraError>;

/// APIクライアント
///
/// 内部の`reqwest::Client`は接続プールを共有するため、クローンは安価です。
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// 新しいAPIクライアントを作成
    ///
    /// # Arguments
    /// * `base_url` - 変換サービスのベースURL（例: "http://127.0.0.1:8000"）
    ///
    /// # Returns
    /// 設定済みのAPIクライアント
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Url::parse(base_url)
            .map_err(|e| InfraError::network(format!("Invalid base URL '{}': {}", base_url, e)))?;

        let timeout = Duration::from_secs(APP_CONFIG.api.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfraError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETリクエストを送信
    ///
    /// # Arguments
    /// * `endpoint` - エンドポイントパス（例: "/info"）
    /// * `query` - クエリパラメータ（URLエンコードされる）
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> ApiResult<Response> {
        let url = self.build_url(endpoint);
        let request = self.client.get(&url).query(query);

        Self::send_with_error_handling(request, endpoint, "GET").await
    }

    /// POSTリクエストを送信
    ///
    /// # Arguments
    /// * `endpoint` - エンドポイントパス（例: "/convert"）
    /// * `body` - リクエストボディ（JSON）
    pub async fn post<T: serde::Serialize>(&self, endpoint: &str, body: &T) -> ApiResult<Response> {
        let url = self.build_url(endpoint);
        let request = self.client.post(&url).json(body);

        Self::send_with_error_handling(request, endpoint, "POST").await
    }

    /// 完全なURLへGETリクエストを送信（ファイル転送用）
    ///
    /// 転送には通常より長いタイムアウトを使う。
    pub async fn get_absolute(&self, url: &str) -> ApiResult<Response> {
        let request = self
            .client
            .get(url)
            .timeout(Duration::from_secs(APP_CONFIG.api.download_timeout_seconds));

        Self::send_with_error_handling(request, url, "GET").await
    }

    /// エンドポイントとクエリからURLを組み立てる（送信はしない）
    pub fn endpoint_url(&self, endpoint: &str, query: &[(&str, &str)]) -> ApiResult<String> {
        let url = Url::parse_with_params(&self.build_url(endpoint), query)
            .map_err(|e| InfraError::network(format!("Failed to build URL for {}: {}", endpoint, e)))?;
        Ok(url.into())
    }

    /// サーバーが返したロケータを絶対URLに解決する
    ///
    /// 相対パスはベースURLを基準に解決し、絶対URLはそのまま返す。
    pub fn resolve_url(&self, locator: &str) -> ApiResult<String> {
        let base = Url::parse(&format!("{}/", self.base_url))
            .map_err(|e| InfraError::network(format!("Invalid base URL: {}", e)))?;
        let resolved = base
            .join(locator.trim())
            .map_err(|e| InfraError::network(format!("Invalid download URL '{}': {}", locator, e)))?;
        Ok(resolved.into())
    }

    /// URLを構築
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// リクエストを送信し、エラーハンドリングを行う
    async fn send_with_error_handling(
        request: reqwest::RequestBuilder,
        endpoint: &str,
        method: &str,
    ) -> ApiResult<Response> {
        debug!(method, endpoint, "sending request");

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                InfraError::timeout(format!("{} {}", method, endpoint))
            } else if e.is_connect() {
                InfraError::network(format!("Connection failed for {} {}: {}", method, endpoint, e))
            } else {
                InfraError::network(format!("Request failed for {} {}: {}", method, endpoint, e))
            }
        })
    }

    /// レスポンスをチェックしてエラーを返す
    ///
    /// 非2xxの場合はボディの`error`/`detail`をメッセージとして
    /// 操作に応じたエラーへ変換する。
    pub async fn check_response(response: Response, operation: ServiceOperation) -> ApiResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        debug!(status_code, ?operation, "service returned an error");

        Err(operation.failure(ErrorBody::message_from(&body), Some(status_code)))
    }

    /// JSONレスポンスをデシリアライズ
    pub async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| InfraError::network(format!("Failed to parse JSON response: {}", e)))
    }
}
