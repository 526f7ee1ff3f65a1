//! Scheduler client speaking the Marathon REST API.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use crate::{
    config::MarathonConfig,
    domain::{
        descriptor::DeploymentDescriptor,
        error::{DomainError, Result},
        model::{DeploymentOutcome, DeploymentStatus},
        port::Scheduler,
    },
};

#[derive(Debug, Clone)]
pub struct MarathonClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct MarathonErrorBody {
    message: Option<String>,
    #[serde(default)]
    details: Vec<MarathonErrorDetail>,
}

#[derive(Deserialize)]
struct MarathonErrorDetail {
    path: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct AppEnvelope {
    app: AppState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppState {
    #[serde(default)]
    instances: u32,
    #[serde(default)]
    tasks_running: u32,
    #[serde(default)]
    tasks_staged: u32,
    #[serde(default)]
    tasks_healthy: u32,
    #[serde(default)]
    tasks_unhealthy: u32,
}

impl MarathonClient {
    pub fn new(config: &MarathonConfig) -> anyhow::Result<Self> {
        Self::with_timeout(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Can't build Marathon HTTP client")?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn app_url(&self, deployment_id: &str) -> String {
        format!(
            "{}/v2/apps/{}",
            self.base_url,
            deployment_id.trim_start_matches('/')
        )
    }

    fn transport_error(&self, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            DomainError::SchedulerUnreachable(format!(
                "no answer from {} within {}s",
                self.base_url,
                self.timeout.as_secs_f32()
            ))
        } else {
            DomainError::SchedulerUnreachable(format!("{}: {}", self.base_url, error))
        }
    }

    /// 4xx is the scheduler refusing the request, anything else unexpected is
    /// treated as the scheduler being unavailable.
    async fn classify(&self, response: Response) -> DomainError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            DomainError::SchedulerRejected {
                status: status.as_u16(),
                reason: rejection_reason(&body, status),
            }
        } else {
            DomainError::SchedulerUnreachable(format!(
                "{} answered {}: {}",
                self.base_url, status, body
            ))
        }
    }
}

fn rejection_reason(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<MarathonErrorBody>(body) {
        Ok(error) => {
            let details: Vec<String> = error
                .details
                .into_iter()
                .flat_map(|detail| {
                    let path = detail.path.unwrap_or_default();
                    detail
                        .errors
                        .into_iter()
                        .map(move |message| format!("{} {}", path, message).trim().to_string())
                })
                .collect();
            let message = error
                .message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("rejected").to_string());
            if details.is_empty() {
                message
            } else {
                format!("{} ({})", message, details.join("; "))
            }
        }
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.canonical_reason().unwrap_or("rejected").to_string(),
    }
}

#[async_trait]
impl Scheduler for MarathonClient {
    async fn submit(&self, descriptor: &DeploymentDescriptor) -> Result<DeploymentOutcome> {
        debug!("Submitting {} to {}", descriptor.id, self.base_url);
        let response = self
            .client
            .post(format!("{}/v2/apps", self.base_url))
            .json(descriptor)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            Ok(DeploymentOutcome::Accepted)
        } else {
            Err(self.classify(response).await)
        }
    }

    async fn remove(&self, deployment_id: &str) -> Result<DeploymentOutcome> {
        let response = self
            .client
            .delete(format!("{}?force=true", self.app_url(deployment_id)))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(DeploymentOutcome::AlreadyAbsent),
            status if status.is_success() => Ok(DeploymentOutcome::Removed),
            _ => Err(self.classify(response).await),
        }
    }

    async fn status(&self, deployment_id: &str) -> Result<Option<DeploymentStatus>> {
        let response = self
            .client
            .get(self.app_url(deployment_id))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let envelope: AppEnvelope =
                    response.json().await.map_err(|e| self.transport_error(e))?;
                Ok(Some(DeploymentStatus {
                    instances: envelope.app.instances,
                    tasks_running: envelope.app.tasks_running,
                    tasks_staged: envelope.app.tasks_staged,
                    tasks_healthy: envelope.app.tasks_healthy,
                    tasks_unhealthy: envelope.app.tasks_unhealthy,
                }))
            }
            _ => Err(self.classify(response).await),
        }
    }
}
