use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::MicrobadgerConfig,
    domain::{model::ImageMetadata, port::ImageMetadataLookup},
};

#[derive(Debug, Clone)]
pub struct MicrobadgerClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImageResponse {
    image_name: String,
    author: Option<String>,
    description: Option<String>,
    latest_version: Option<String>,
    layer_count: Option<u32>,
    download_size: Option<u64>,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
}

/// Outcome of one query, keeping "no such image" apart from transport failures.
#[derive(Debug)]
enum Lookup {
    Found(ImageMetadata),
    Missing,
}

impl MicrobadgerClient {
    pub fn new(config: &MicrobadgerConfig) -> anyhow::Result<Self> {
        Self::with_timeout(&config.url, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Can't build Microbadger HTTP client")?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, namespace: &str, image: &str) -> Result<Lookup, reqwest::Error> {
        let response = self
            .client
            .get(format!("{}/v1/images/{}/{}", self.base_url, namespace, image))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Lookup::Missing);
        }
        let body: ImageResponse = response.error_for_status()?.json().await?;
        Ok(Lookup::Found(ImageMetadata {
            namespace: namespace.to_string(),
            name: image.to_string(),
            image_name: body.image_name,
            author: body.author.filter(|author| !author.is_empty()),
            description: body.description.filter(|description| !description.is_empty()),
            latest_version: body.latest_version,
            layer_count: body.layer_count,
            download_size: body.download_size,
            labels: body.labels.unwrap_or_default(),
        }))
    }
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[async_trait]
impl ImageMetadataLookup for MicrobadgerClient {
    async fn lookup(&self, namespace: Option<&str>, image: Option<&str>) -> Option<ImageMetadata> {
        let (namespace, image) = (namespace?.trim(), image?.trim());
        if !valid_segment(namespace) || !valid_segment(image) {
            debug!("Skipping image lookup for '{}/{}'", namespace, image);
            return None;
        }
        match self.fetch(namespace, image).await {
            Ok(Lookup::Found(metadata)) => Some(metadata),
            Ok(Lookup::Missing) => {
                debug!("No metadata for {}/{}", namespace, image);
                None
            }
            Err(e) => {
                warn!("Image lookup for {}/{} failed: {}", namespace, image, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::infra::test_support::{serve, unused_address};

    async fn image(Path((namespace, name)): Path<(String, String)>) -> impl IntoResponse {
        match (namespace.as_str(), name.as_str()) {
            ("hbpmip", "portal-backend") => (
                StatusCode::OK,
                Json(json!({
                    "ImageName": "hbpmip/portal-backend",
                    "Author": "",
                    "LatestVersion": "2.3.0",
                    "LayerCount": 12,
                    "DownloadSize": 182736451u64,
                    "Labels": {"org.label-schema.name": "portal-backend"},
                })),
            ),
            ("broken", _) => (StatusCode::OK, Json(json!({"unexpected": true}))),
            _ => (StatusCode::NOT_FOUND, Json(json!({}))),
        }
    }

    async fn client() -> MicrobadgerClient {
        let url = serve(Router::new().route("/v1/images/:namespace/:name", get(image))).await;
        MicrobadgerClient::with_timeout(&url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn known_image_is_found() {
        let metadata = client()
            .await
            .lookup(Some("hbpmip"), Some("portal-backend"))
            .await
            .unwrap();
        assert_eq!(metadata.image_name, "hbpmip/portal-backend");
        assert_eq!(metadata.namespace, "hbpmip");
        assert_eq!(metadata.author, None);
        assert_eq!(metadata.latest_version.as_deref(), Some("2.3.0"));
        assert_eq!(metadata.layer_count, Some(12));
        assert_eq!(
            metadata.labels.get("org.label-schema.name").map(String::as_str),
            Some("portal-backend")
        );
    }

    #[tokio::test]
    async fn unknown_namespace_is_empty() {
        assert_eq!(
            client().await.lookup(Some("toto"), Some("portal-backend")).await,
            None
        );
    }

    #[tokio::test]
    async fn missing_or_malformed_input_is_empty() {
        let client = client().await;
        assert_eq!(client.lookup(None, None).await, None);
        assert_eq!(client.lookup(Some("hbpmip"), None).await, None);
        assert_eq!(client.lookup(Some(""), Some("portal-backend")).await, None);
        assert_eq!(client.lookup(Some("hbpmip/x"), Some("portal-backend")).await, None);
    }

    #[tokio::test]
    async fn unexpected_payload_is_empty() {
        assert_eq!(client().await.lookup(Some("broken"), Some("image")).await, None);
    }

    #[tokio::test]
    async fn unreachable_service_is_empty() {
        let client = MicrobadgerClient::with_timeout(
            &format!("http://{}", unused_address().await),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.lookup(Some("hbpmip"), Some("portal-backend")).await, None);
    }
}
