/// 変換サービスクライアント
///
/// 動画情報の取得、変換リクエスト、変換済みファイルの保存を行う。
/// UIの状態には一切触れず、結果かエラーを返すだけである。
use crate::api::client::ApiClient;
use crate::api::error::{InfraError, ServiceOperation};
use crate::api::types::{ConvertRequestBody, ConvertResponse, InfoResponse};
use crate::config::ConversionMode;
use crate::domain::media::{ConversionRequest, DownloadHandle, VideoId, VideoMetadata};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// 変換サービスへの操作
///
/// いずれの操作も再試行可能で、失敗時にローカル状態を変更しない。
pub trait ConversionService {
    /// 動画情報を取得する
    fn fetch_metadata(
        &self,
        video_id: &VideoId,
    ) -> impl Future<Output = Result<VideoMetadata, InfraError>> + Send;

    /// 変換を依頼し、ダウンロードハンドルを受け取る
    fn request_conversion(
        &self,
        request: &ConversionRequest,
    ) -> impl Future<Output = Result<DownloadHandle, InfraError>> + Send;

    /// 変換済みファイルを`destination`へ保存する
    ///
    /// 失敗時は書きかけのファイルを削除する。
    fn download(
        &self,
        handle: &DownloadHandle,
        destination: &Path,
    ) -> impl Future<Output = Result<PathBuf, InfraError>> + Send;
}

/// HTTP経由の変換サービスクライアント
#[derive(Debug, Clone)]
pub struct HttpConversionClient {
    api: ApiClient,
    mode: ConversionMode,
}

impl HttpConversionClient {
    pub fn new(api: ApiClient, mode: ConversionMode) -> Self {
        Self { api, mode }
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    /// リクエストから直接ダウンロードURLを組み立てる
    fn direct_locator(&self, request: &ConversionRequest) -> Result<String, InfraError> {
        let endpoint = format!("/download/{}", request.format().as_str());
        let level = request.quality().map(|q| q.level().to_string());

        let mut query = vec![("url", request.source_url())];
        if let Some(level) = level.as_deref() {
            query.push(("quality", level));
        }

        self.api.endpoint_url(&endpoint, &query)
    }

    async fn convert_on_server(&self, request: &ConversionRequest) -> Result<String, InfraError> {
        let body = ConvertRequestBody::from(request);
        let response = self.api.post("/convert", &body).await?;
        let response = ApiClient::check_response(response, ServiceOperation::Conversion).await?;
        let parsed: ConvertResponse = ApiClient::parse_json(response).await.map_err(|e| {
            debug!("unreadable conversion response: {}", e);
            ServiceOperation::Conversion.failure(None, None)
        })?;

        if parsed.download_url.trim().is_empty() {
            return Err(ServiceOperation::Conversion.failure(None, None));
        }
        self.api.resolve_url(&parsed.download_url)
    }

    /// 一時ファイル（`<destination>.part`）へ書き込む
    async fn stream_to_file(&self, handle: &DownloadHandle, partial: &Path) -> Result<u64, InfraError> {
        let response = self.api.get_absolute(&handle.url).await?;
        let mut response = ApiClient::check_response(response, ServiceOperation::Download).await?;

        if let Some(parent) = partial.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = File::create(partial).await?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| InfraError::download_failed(format!("Transfer interrupted: {}", e), None))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

impl ConversionService for HttpConversionClient {
    async fn fetch_metadata(&self, video_id: &VideoId) -> Result<VideoMetadata, InfraError> {
        let canonical = video_id.canonical_url();
        let response = self.api.get("/info", &[("url", canonical.as_str())]).await?;
        let response = ApiClient::check_response(response, ServiceOperation::Metadata).await?;

        let info: InfoResponse = ApiClient::parse_json(response).await.map_err(|e| {
            debug!("unreadable metadata response: {}", e);
            ServiceOperation::Metadata.failure(None, None)
        })?;

        if !info.success {
            return Err(ServiceOperation::Metadata.failure(info.error, None));
        }

        debug!(video_id = %video_id, title = %info.title, "metadata fetched");
        Ok(info.into_metadata())
    }

    async fn request_conversion(
        &self,
        request: &ConversionRequest,
    ) -> Result<DownloadHandle, InfraError> {
        let url = match self.mode {
            ConversionMode::Direct => self.direct_locator(request)?,
            ConversionMode::Server => self.convert_on_server(request).await?,
        };

        info!(mode = %self.mode, url = %url, "download handle resolved");
        Ok(DownloadHandle {
            url,
            format: request.format(),
        })
    }

    async fn download(
        &self,
        handle: &DownloadHandle,
        destination: &Path,
    ) -> Result<PathBuf, InfraError> {
        let partial = partial_path(destination);

        let result = match self.stream_to_file(handle, &partial).await {
            Ok(bytes) => tokio::fs::rename(&partial, destination)
                .await
                .map(|_| bytes)
                .map_err(InfraError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                info!(path = %destination.display(), bytes, "file saved");
                Ok(destination.to_path_buf())
            }
            Err(e) => {
                if tokio::fs::try_exists(&partial).await.unwrap_or(false) {
                    if let Err(remove_err) = tokio::fs::remove_file(&partial).await {
                        warn!(
                            path = %partial.display(),
                            "failed to remove partial file: {}", remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }
}
