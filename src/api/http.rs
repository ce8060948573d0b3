//! reqwest implementation of [`ReviewApi`].
//!
//! Thin HTTP wrapper: every call attaches the bearer header, maps non-2xx
//! answers through [`ApiError::from_status`], and decodes the body with the
//! pure `decode` helper so parsing stays testable without a server.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use review::consts::INTERVAL_COUNT;
use review::{DetectedItem, ItemId, ItemKind, Metrics};
use serde::de::DeserializeOwned;

use super::types::{CaseSummary, Detections, FileInfo, Job, MessageResponse, OverridesRequest, ReprocessResponse};
use super::{CaseId, ReviewApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::Session;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl HttpApi {
    /// Build a client for `config.api_url` carrying `session` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for an unparsable base URL and
    /// [`ApiError::HttpClientBuild`] when reqwest cannot build its client.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url).map_err(|e| ApiError::Config(format!("{}: {e}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("{} cannot be used as a base URL", config.api_url)));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, session })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = endpoint(&self.base_url, segments);
        tracing::debug!(%method, %url, "backend request");
        self.http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, self.session.authorization())
    }

    /// Send and return the raw body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "backend unreachable");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            let err = ApiError::from_status(status, &text);
            tracing::debug!(status, error = %err, "backend rejected request");
            return Err(err);
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let text = self.send(request).await?;
        decode(&text)
    }
}

#[async_trait::async_trait]
impl ReviewApi for HttpApi {
    async fn file_info(&self, case_id: CaseId) -> Result<FileInfo, ApiError> {
        let id = case_id.to_string();
        self.send_json(self.request(Method::GET, &["cases", &id, "file"])).await
    }

    async fn detections(&self, case_id: CaseId) -> Result<Detections, ApiError> {
        let id = case_id.to_string();
        self.send_json(self.request(Method::GET, &["cases", &id, "detections"]))
            .await
    }

    async fn metrics(&self, case_id: CaseId) -> Result<Metrics, ApiError> {
        let id = case_id.to_string();
        self.send_json(self.request(Method::GET, &["cases", &id, "metrics"])).await
    }

    async fn delete_item(&self, case_id: CaseId, item_id: &ItemId, kind: ItemKind) -> Result<(), ApiError> {
        let id = case_id.to_string();
        let item = item_id.to_string();
        let request = self
            .request(Method::DELETE, &["cases", &id, "detections", "items", &item])
            .query(&[("type", kind.as_str())]);
        self.send(request).await?;
        tracing::info!(case_id, item_id = %item_id, %kind, "item deleted");
        Ok(())
    }

    async fn restore_item(&self, case_id: CaseId, item: &DetectedItem, kind: ItemKind) -> Result<(), ApiError> {
        let id = case_id.to_string();
        let request = self
            .request(Method::POST, &["cases", &id, "detections", "items"])
            .query(&[("type", kind.as_str())])
            .json(item);
        self.send(request).await?;
        tracing::info!(case_id, item_id = %item.id, %kind, "item restored");
        Ok(())
    }

    async fn save_overrides(&self, case_id: CaseId, counts: [i64; INTERVAL_COUNT]) -> Result<(), ApiError> {
        let id = case_id.to_string();
        let request = self
            .request(Method::PUT, &["cases", &id, "metrics", "overrides"])
            .json(&OverridesRequest { counts: &counts });
        self.send(request).await?;
        tracing::info!(case_id, ?counts, "interval overrides saved");
        Ok(())
    }

    async fn reprocess(&self, case_id: CaseId) -> Result<ReprocessResponse, ApiError> {
        let id = case_id.to_string();
        let response: ReprocessResponse = self
            .send_json(self.request(Method::POST, &["cases", &id, "reprocess"]))
            .await?;
        tracing::info!(case_id, job_id = ?response.job_id, "reprocessing requested");
        Ok(response)
    }

    async fn latest_job(&self, case_id: CaseId) -> Result<Job, ApiError> {
        let id = case_id.to_string();
        self.send_json(self.request(Method::GET, &["cases", &id, "jobs", "latest"]))
            .await
    }

    async fn list_cases(&self) -> Result<Vec<CaseSummary>, ApiError> {
        self.send_json(self.request(Method::GET, &["cases"])).await
    }

    async fn approve_dataset(&self, case_id: CaseId) -> Result<String, ApiError> {
        let id = case_id.to_string();
        let response: MessageResponse = self
            .send_json(self.request(Method::POST, &["cases", &id, "dataset-approve"]))
            .await?;
        tracing::info!(case_id, "dataset approved");
        Ok(response
            .message
            .unwrap_or_else(|| "Case approved for the dataset.".to_owned()))
    }
}

// =============================================================================
// URLS / PARSING
// =============================================================================

/// Append path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
