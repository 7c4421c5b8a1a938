use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::types::{
    DedupeResponse, DedupeSummary, ImagesRequest, ImagesResponse, SaveRequest, SaveResponse,
    ServerCheck, ServerStatus,
};
use super::ApiError;
use crate::config::{Config, Routes};
use crate::state::data::AnnotationMap;

/// Async client for the labeling server.
///
/// Cheap to clone: the underlying connection pool is shared, so each
/// background task takes its own copy.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    routes: Routes,
}

impl ApiClient {
    /// Build a client from the resolved configuration
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self::from_parts(http, config.server_url.clone(), config.routes.clone()))
    }

    pub fn from_parts(http: reqwest::Client, base: Url, routes: Routes) -> Self {
        Self { http, base, routes }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join a route onto the base URL, keeping any path prefix the base has
    fn endpoint(&self, route: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            route.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::Url(format!("{}: {}", joined, e)))
    }

    /// URL that serves the bytes of one image.
    ///
    /// The path travels as a single form-encoded query value, so both `/` and
    /// `\` separators (and spaces, `%`, `&`) reach the server unchanged.
    pub fn image_url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&self.routes.image)?;
        url.query_pairs_mut().append_pair("path", path);
        Ok(url)
    }

    /// Ask the server for all images under `folder_path`
    pub async fn list_images(&self, folder_path: &str) -> Result<Vec<String>, ApiError> {
        let request = self
            .http
            .post(self.endpoint(&self.routes.images)?)
            .json(&ImagesRequest { folder_path });

        let response: ImagesResponse = self.send_json(request).await?;
        let images = response.into_result()?;

        info!("Server listed {} images in {}", images.len(), folder_path);
        Ok(images)
    }

    /// Fetch the raw bytes of one image
    pub async fn image_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.http.get(self.image_url(path)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes for {}", bytes.len(), path);
        Ok(bytes.to_vec())
    }

    /// Send the complete annotation map (not a delta)
    pub async fn save_annotations(&self, annotations: &AnnotationMap) -> Result<(), ApiError> {
        let request = self
            .http
            .post(self.endpoint(&self.routes.save)?)
            .json(&SaveRequest { annotations });

        let response: SaveResponse = self.send_json(request).await?;
        response.into_result()
    }

    /// Run the server-side deduplication pass over the saved CSV
    pub async fn deduplicate(&self) -> Result<DedupeSummary, ApiError> {
        let request = self.http.post(self.endpoint(&self.routes.deduplicate)?);

        let response: DedupeResponse = self.send_json(request).await?;
        response.into_result()
    }

    /// Probe whether the server is up
    pub async fn status(&self) -> Result<ServerStatus, ApiError> {
        let request = self.http.get(self.endpoint(&self.routes.status)?);
        self.send_json(request).await
    }

    /// Probe the status route and sort the answer into up, no route, or unreachable
    pub async fn check(&self) -> ServerCheck {
        ServerCheck::from_result(self.status().await)
    }

    /// Send a request and decode a JSON body, mapping non-2xx to `ApiError::Status`
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
