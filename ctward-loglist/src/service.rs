//! Fetching the raw log list artifacts over HTTP

use reqwest::header::CACHE_CONTROL;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// `log_list.json` must fit in 1 MiB
pub const MAX_LOG_LIST_JSON_SIZE: usize = 1024 * 1024;
/// The detached signature is a single RSA block
pub const MAX_LOG_LIST_SIG_SIZE: usize = 512;
/// `log_list.zip` must fit in 2 MiB
pub const MAX_LOG_LIST_ZIP_SIZE: usize = 2 * 1024 * 1024;

const BASE_URL: &str = "https://www.gstatic.com/ct/log_list/v3/";
const TIMEOUT: Duration = Duration::from_secs(30);

/// Raw transport for the three log list artifacts
pub trait LogListService {
    fn get_log_list(&self) -> impl Future<Output = Result<Vec<u8>, LogListServiceError>>;

    fn get_log_list_signature(&self) -> impl Future<Output = Result<Vec<u8>, LogListServiceError>>;

    fn get_log_list_zip(&self) -> impl Future<Output = Result<Vec<u8>, LogListServiceError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogListServiceError {
    #[error("The response exceeds the maximum of {max} bytes")]
    TooBig { max: usize },

    #[error("Failed to fetch {url}: {cause}")]
    Http { url: String, cause: String },

    #[error("Failed to construct the HTTP client: {0}")]
    Client(String),
}

/// [`LogListService`] implementation against the distributors endpoint
///
/// Responses are never cached by the transport and size limits are enforced while the
/// body streams in, so an oversized response gets dropped without buffering it whole.
#[derive(Debug, Clone)]
pub struct HttpLogListService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpLogListService {
    pub fn new() -> Result<Self, LogListServiceError> {
        let base_url = Url::parse(BASE_URL).map_err(|err| LogListServiceError::Client(err.to_string()))?;
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: Url) -> Result<Self, LogListServiceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(TIMEOUT)
            .timeout(TIMEOUT)
            .build()
            .map_err(|err| LogListServiceError::Client(err.to_string()))?;

        Ok(Self { client, base_url })
    }

    async fn fetch(&self, file: &str, max_size: usize) -> Result<Vec<u8>, LogListServiceError> {
        let url = self
            .base_url
            .join(file)
            .map_err(|err| LogListServiceError::Http {
                url: file.to_owned(),
                cause: err.to_string(),
            })?;

        let http_error = |err: reqwest::Error| LogListServiceError::Http {
            url: url.to_string(),
            cause: err.to_string(),
        };

        let mut response = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache, max-age=0")
            .send()
            .await
            .map_err(http_error)?
            .error_for_status()
            .map_err(http_error)?;

        if let Some(length) = response.content_length()
            && length > max_size as u64
        {
            return Err(LogListServiceError::TooBig { max: max_size });
        }

        let mut data = vec![];
        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            if data.len() + chunk.len() > max_size {
                return Err(LogListServiceError::TooBig { max: max_size });
            }
            data.extend_from_slice(&chunk);
        }

        Ok(data)
    }
}

impl LogListService for HttpLogListService {
    #[tracing::instrument(level = "debug")]
    async fn get_log_list(&self) -> Result<Vec<u8>, LogListServiceError> {
        self.fetch("log_list.json", MAX_LOG_LIST_JSON_SIZE).await
    }

    #[tracing::instrument(level = "debug")]
    async fn get_log_list_signature(&self) -> Result<Vec<u8>, LogListServiceError> {
        self.fetch("log_list.sig", MAX_LOG_LIST_SIG_SIZE).await
    }

    #[tracing::instrument(level = "debug")]
    async fn get_log_list_zip(&self) -> Result<Vec<u8>, LogListServiceError> {
        self.fetch("log_list.zip", MAX_LOG_LIST_ZIP_SIZE).await
    }
}
