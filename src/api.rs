//! HTTP implementations of the remote collaborator traits.
//!
//! A thin reqwest wrapper with bearer auth and JSON bodies. We log method,
//! path, status and latency, never payload contents (student data may pass
//! through these endpoints).

use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, instrument};

use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::domain::{Curso, Rubrica, RubricaPayload};
use crate::services::{validate_rubrica_payload, CourseService, RubricService, ServiceError};

/// Shared REST client for the Analítica Académica API.
#[derive(Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  base_url: String,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(cfg: &ApiConfig) -> Result<Self, ServiceError> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: cfg.base_url.trim_end_matches('/').to_string(),
      token: cfg.token.clone(),
    })
  }

  pub fn from_env() -> Result<Self, ServiceError> {
    Self::new(&ApiConfig::from_env())
  }

  fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    let url = format!("{}{}", self.base_url, path);
    let mut req = self.client.request(method, url).header(ACCEPT, "application/json");
    if let Some(token) = &self.token {
      req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    req
  }

  #[instrument(level = "info", skip(self), fields(%path))]
  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
    let started = Instant::now();
    let resp = self.request(reqwest::Method::GET, path).send().await?;
    self.decode(resp, path, "GET", started).await
  }

  #[instrument(level = "info", skip(self, body), fields(%path))]
  async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T, ServiceError> {
    let started = Instant::now();
    let resp = self
      .request(reqwest::Method::POST, path)
      .json(body)
      .send()
      .await?;
    self.decode(resp, path, "POST", started).await
  }

  async fn decode<T: DeserializeOwned>(
    &self,
    resp: reqwest::Response,
    path: &str,
    method: &str,
    started: Instant,
  ) -> Result<T, ServiceError> {
    let status = resp.status();
    let ms = started.elapsed().as_millis();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      error!(target: "analitica_config", method, path, status = status.as_u16(), ms, "API error");
      return Err(ServiceError::Status { status: status.as_u16(), body });
    }
    let text = resp.text().await?;
    info!(target: "analitica_config", method, path, status = status.as_u16(), ms, bytes = text.len(), "API ok");
    Ok(serde_json::from_str(&text)?)
  }
}

/// Rubric catalog over HTTP.
pub struct HttpRubricService {
  api: ApiClient,
}

impl HttpRubricService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl RubricService for HttpRubricService {
  async fn list(&self) -> Result<Vec<Rubrica>, ServiceError> {
    self.api.get_json("/rubricas/").await
  }

  /// Pre-validates locally before POSTing, so obviously broken payloads
  /// never hit the network.
  async fn create(&self, payload: &RubricaPayload) -> Result<Rubrica, ServiceError> {
    validate_rubrica_payload(payload)?;
    self.api.post_json("/rubricas/", payload).await
  }
}

/// Course catalog over HTTP.
pub struct HttpCourseService {
  api: ApiClient,
}

impl HttpCourseService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl CourseService for HttpCourseService {
  async fn list_enabled(&self) -> Result<Vec<Curso>, ServiceError> {
    self.api.get_json("/cursos?habilitados_only=true").await
  }
}
