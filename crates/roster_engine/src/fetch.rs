use std::time::Duration;

use engine_logging::engine_debug;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use roster_core::{Page, QueryKey, Record};

use crate::adapter::{decode_page, server_message};
use crate::endpoint::{endpoint_for, json_body, request_params, Method};
use crate::{ApiContext, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Fetches one page of a resource list.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, key: &QueryKey, page: u32) -> Result<Page<Record>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    settings: FetchSettings,
    context: ApiContext,
    client: reqwest::Client,
}

impl ReqwestPageFetcher {
    pub fn new(settings: FetchSettings, context: ApiContext) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            context,
            client,
        })
    }

    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    fn build_request(
        &self,
        key: &QueryKey,
        page: u32,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        let endpoint = endpoint_for(key.resource());
        let params = request_params(key, page, &self.context);
        let mut url = self.context.endpoint_url(endpoint.path)?;

        let builder = match endpoint.method {
            Method::Get => {
                url.query_pairs_mut().extend_pairs(params.iter());
                self.client.get(url)
            }
            Method::Post => {
                let body = serde_json::to_vec(&json_body(&params))
                    .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .body(body)
            }
        };
        let builder = builder.header(ACCEPT, "application/json");
        Ok(match &self.context.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, key: &QueryKey, page: u32) -> Result<Page<Record>, FetchError> {
        let request = self.build_request(key, page)?;
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        let body = self.read_body(response).await?;
        engine_debug!(
            "Page {} of {} answered {} ({} bytes)",
            page,
            key,
            status,
            body.len()
        );

        if !status.is_success() {
            return Err(
                FetchError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                    .with_server_message(server_message(&body)),
            );
        }

        decode_page(key.resource(), &body)
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
