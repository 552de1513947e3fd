// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Remote sandbox service client.
//!
//! Speaks a small JSON API against a cloud sandbox service:
//!
//! - `POST   /sandboxes`        create
//! - `GET    /sandboxes/{id}`   connect/inspect
//! - `DELETE /sandboxes/{id}`   kill
//! - `GET    /sandboxes`        list
//!
//! The service is opaque beyond the instance id, its workspace path,
//! timeout, and metadata tags. Connection failures surface as
//! [`WorkspaceError`] variants; the lifecycle manager decides whether to
//! fall back to fresh creation.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[cfg(feature = "telemetry")]
use tracing::debug;

use crate::config::SandboxConfig;
use crate::error::WorkspaceError;

use super::{SandboxInstance, SandboxProvider};

/// HTTP client for the remote sandbox provider.
pub struct RemoteSandboxClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSandboxRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_stop_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ports: Option<&'a Vec<u16>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    runtime: Option<&'a String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SandboxDto {
    id: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    workdir: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_activity: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl SandboxDto {
    fn into_instance(self, config: SandboxConfig) -> SandboxInstance {
        let now = Utc::now();
        SandboxInstance {
            id: self.id,
            active: self.active,
            root: PathBuf::from(self.workdir.unwrap_or_else(|| "/workspace".to_string())),
            created_at: self.created_at.unwrap_or(now),
            last_activity: self.last_activity.unwrap_or(now),
            config,
        }
    }
}

impl RemoteSandboxClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl SandboxProvider for RemoteSandboxClient {
    async fn create(&self, config: &SandboxConfig) -> Result<SandboxInstance, WorkspaceError> {
        let body = CreateSandboxRequest {
            timeout_ms: config.timeout_ms,
            auto_stop_delay_ms: config.auto_stop_delay_ms,
            ports: config.ports.as_ref(),
            runtime: config.runtime.as_ref(),
            metadata: config.metadata.as_ref(),
        };

        let response = self
            .request(reqwest::Method::POST, "/sandboxes")
            .json(&body)
            .send()
            .await
            .map_err(|e| WorkspaceError::CreationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WorkspaceError::CreationFailed(format!(
                "sandbox service returned {}",
                response.status()
            )));
        }

        let dto: SandboxDto = response
            .json()
            .await
            .map_err(|e| WorkspaceError::CreationFailed(e.to_string()))?;

        #[cfg(feature = "telemetry")]
        debug!(id = %dto.id, "Remote sandbox created");

        Ok(dto.into_instance(config.clone()))
    }

    async fn connect(&self, id: &str) -> Result<SandboxInstance, WorkspaceError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/sandboxes/{id}"))
            .send()
            .await
            .map_err(|e| WorkspaceError::ConnectionFailed {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(WorkspaceError::NotFound(id.to_string())),
            status if !status.is_success() => Err(WorkspaceError::ConnectionFailed {
                id: id.to_string(),
                message: format!("sandbox service returned {status}"),
            }),
            _ => {
                let dto: SandboxDto =
                    response
                        .json()
                        .await
                        .map_err(|e| WorkspaceError::ConnectionFailed {
                            id: id.to_string(),
                            message: e.to_string(),
                        })?;
                Ok(dto.into_instance(SandboxConfig::default()))
            }
        }
    }

    async fn kill(&self, id: &str) -> Result<(), WorkspaceError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/sandboxes/{id}"))
            .send()
            .await
            .map_err(|e| WorkspaceError::Provider(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(WorkspaceError::NotFound(id.to_string())),
            status if !status.is_success() => Err(WorkspaceError::Provider(format!(
                "sandbox service returned {status}"
            ))),
            _ => Ok(()),
        }
    }

    async fn list(&self) -> Result<Vec<SandboxInstance>, WorkspaceError> {
        let response = self
            .request(reqwest::Method::GET, "/sandboxes")
            .send()
            .await
            .map_err(|e| WorkspaceError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WorkspaceError::Provider(format!(
                "sandbox service returned {}",
                response.status()
            )));
        }

        let dtos: Vec<SandboxDto> = response
            .json()
            .await
            .map_err(|e| WorkspaceError::Provider(e.to_string()))?;

        Ok(dtos
            .into_iter()
            .map(|dto| dto.into_instance(SandboxConfig::default()))
            .collect())
    }
}
