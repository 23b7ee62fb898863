use crate::error::SpeechError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Timeout for a single request to the voice service.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Content type of recorded audio uploaded for recognition.
const FLAC_CONTENT_TYPE: &str = "audio/x-flac; rate=16000;";

/// HTTP transfer primitives used by the remote backends.
///
/// The Google backends only use `upload_data`. `upload_file` serves
/// recognition endpoints that take the raw FLAC body, and `download_file`
/// serves TTS endpoints that return audio for a query string.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// POSTs a JSON payload and returns the response body.
    async fn upload_data(&self, url: &str, payload: &str) -> Result<String, SpeechError>;

    /// POSTs the contents of a FLAC file and returns the response body.
    async fn upload_file(&self, url: &str, path: &Path) -> Result<String, SpeechError>;

    /// GETs `url` with the URL-encoded `query` appended and stores the body at `dest`.
    async fn download_file(&self, url: &str, query: &str, dest: &Path) -> Result<(), SpeechError>;
}

#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new() -> Result<Self, SpeechError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SpeechError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn body(response: reqwest::Response) -> Result<String, SpeechError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Transport(format!("HTTP {}: {}", status, body)));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload_data(&self, url: &str, payload: &str) -> Result<String, SpeechError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await?;
        let body = Self::body(response).await?;
        tracing::debug!(bytes = body.len(), "uploaded data");
        Ok(body)
    }

    async fn upload_file(&self, url: &str, path: &Path) -> Result<String, SpeechError> {
        let data = tokio::fs::read(path).await?;
        let size = data.len();
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, FLAC_CONTENT_TYPE)
            .body(data)
            .send()
            .await?;
        let body = Self::body(response).await?;
        tracing::debug!(path = %path.display(), bytes = size, "uploaded file");
        Ok(body)
    }

    async fn download_file(&self, url: &str, query: &str, dest: &Path) -> Result<(), SpeechError> {
        let full_url = format!("{}{}", url, urlencoding::encode(query));
        let response = self.client.get(&full_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Transport(format!("HTTP {}: {}", status, body)));
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        tracing::debug!(dest = %dest.display(), bytes = bytes.len(), "downloaded file");
        Ok(())
    }
}
