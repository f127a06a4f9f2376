//! REST seam to the remote forecasting/optimization service. The trait keeps
//! workflows testable against loopback fakes; `HttpPlanningApi` is the real
//! reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::error::RemoteError;
use shared::protocol::{
    ErrorBody, HealthResponse, PlanRequest, PlanResponse, PredictRequest, PredictResponse,
    ProductInfoResponse, ProductListResponse, StatsResponse, UploadResponse,
};
use tracing::debug;

use crate::staging::StagedFile;

/// Uploads carry whole CSV files and get the longest budget.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Forecast and stock-plan requests run the model server-side.
pub const PLANNING_TIMEOUT: Duration = Duration::from_secs(45);

#[async_trait]
pub trait PlanningApi: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, RemoteError>;
    async fn list_products(&self) -> Result<ProductListResponse, RemoteError>;
    async fn product_stats(&self) -> Result<StatsResponse, RemoteError>;
    async fn product_info(&self, product_id: &str) -> Result<ProductInfoResponse, RemoteError>;
    async fn upload(&self, files: &[StagedFile]) -> Result<UploadResponse, RemoteError>;
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, RemoteError>;
    async fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, RemoteError>;
}

pub struct HttpPlanningApi {
    http: Client,
    base_url: String,
}

impl HttpPlanningApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, RemoteError> {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }
}

#[async_trait]
impl PlanningApi for HttpPlanningApi {
    async fn health(&self) -> Result<HealthResponse, RemoteError> {
        self.get_json("/health").await
    }

    async fn list_products(&self) -> Result<ProductListResponse, RemoteError> {
        self.get_json("/products").await
    }

    async fn product_stats(&self) -> Result<StatsResponse, RemoteError> {
        self.get_json("/products/stats").await
    }

    async fn product_info(&self, product_id: &str) -> Result<ProductInfoResponse, RemoteError> {
        self.get_json(&format!("/products/{product_id}/info")).await
    }

    async fn upload(&self, files: &[StagedFile]) -> Result<UploadResponse, RemoteError> {
        let mut form = multipart::Form::new();
        for file in files {
            let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            if let Some(media_type) = &file.media_type {
                part = part
                    .mime_str(media_type)
                    .map_err(|err| RemoteError::Network(format!("invalid media type: {err}")))?;
            }
            form = form.part(file.kind.as_str(), part);
        }
        debug!(files = files.len(), "POST /upload");
        let response = self
            .http
            .post(self.url("/upload"))
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        decode(response).await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, RemoteError> {
        self.post_json("/predict", request, PLANNING_TIMEOUT).await
    }

    async fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, RemoteError> {
        self.post_json("/plan", request, PLANNING_TIMEOUT).await
    }
}

/// Success bodies deserialize into `T`; failure bodies surface the backend's
/// `error` field, falling back to a generic message when the body is not the
/// expected shape.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|err| RemoteError::Network(format!("invalid response body: {err}")));
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("request failed with status {status}"),
    };
    if status == StatusCode::NOT_FOUND {
        Err(RemoteError::NotFound(message))
    } else {
        Err(RemoteError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Network(err.to_string())
    }
}
