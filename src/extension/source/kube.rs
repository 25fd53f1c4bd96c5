//! Kubernetes source: lists labeled ConfigMaps through the API server.

use super::{ConfigMapObject, ExtensionSource, LabelSelector, RawRecord};
use crate::config::KubeConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KubeSource {
    client: Client,
    server: String,
    token: Option<String>,
    namespace: Option<String>,
    selector: LabelSelector,
}

impl KubeSource {
    pub fn new(config: &KubeConfig, selector: LabelSelector) -> Result<Self, FetchError> {
        let server = config
            .server
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FetchError::NotConfigured("extensions.kube.server is not set".to_string()))?;

        let token = match (&config.token, &config.token_file) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(path)) => Some(
                std::fs::read_to_string(path)
                    .map_err(|source| FetchError::Io {
                        path: path.clone(),
                        source,
                    })?
                    .trim()
                    .to_string(),
            ),
            (None, None) => None,
        };

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify)
            .build()
            .map_err(|e| FetchError::NotConfigured(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            token,
            namespace: config.namespace.clone().filter(|ns| !ns.is_empty()),
            selector,
        })
    }

    fn list_url(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/api/v1/namespaces/{}/configmaps", self.server, ns),
            None => format!("{}/api/v1/configmaps", self.server),
        }
    }

    fn request_error(&self, message: impl Into<String>) -> FetchError {
        FetchError::Request {
            selector: self.selector.as_str().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ExtensionSource for KubeSource {
    async fn list_records(&self) -> Result<Vec<RawRecord>, FetchError> {
        let mut request = self
            .client
            .get(self.list_url())
            .query(&[("labelSelector", self.selector.as_str())]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(format!("request timeout: {}", e))
            } else if e.is_connect() {
                self.request_error(format!("connection error: {}", e))
            } else {
                self.request_error(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Unauthorized(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(self.request_error(format!("status {}: {}", status, body)));
        }

        let list: ConfigMapObject = response
            .json()
            .await
            .map_err(|e| self.request_error(format!("failed to parse response: {}", e)))?;

        let records = list
            .items
            .into_iter()
            .filter(|item| self.selector.matches(&item.metadata.labels))
            .map(|item| item.into_record(""))
            .collect();
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("kube {}", self.list_url())
    }
}
