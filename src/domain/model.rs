use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type ApplicationId = u64;
pub type ContainerId = u64;
pub type ConfigurationId = u64;

pub type EnvVars = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub description: String,
    pub command: Option<String>,
    pub container: Option<ContainerSpec>,
    pub configurations: Vec<DeploymentConfiguration>,
}

impl Application {
    pub fn configuration(&self, id: ConfigurationId) -> Option<&DeploymentConfiguration> {
        self.configurations
            .iter()
            .find(|configuration| configuration.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub id: ContainerId,
    pub application_id: ApplicationId,
    pub image: String,
    /// Exposed ports, in declaration order.
    pub ports: Vec<u16>,
}

/// One deployable variant of an application (e.g. staging vs production sizing).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfiguration {
    pub id: ConfigurationId,
    pub application_id: ApplicationId,
    /// Fractional cores.
    pub cpu: f64,
    /// Megabytes.
    pub memory: u32,
    pub env_vars: EnvVars,
}

/// Validated input for creating or replacing an application and its owned records
/// in one write.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationDraft {
    pub name: String,
    pub description: String,
    pub command: Option<String>,
    pub container: Option<ContainerDraft>,
    pub configurations: Vec<ConfigurationDraft>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerDraft {
    pub image: String,
    pub ports: Vec<u16>,
}

/// `id` is set when the draft targets an existing configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationDraft {
    pub id: Option<ConfigurationId>,
    pub cpu: f64,
    pub memory: u32,
    pub env_vars: EnvVars,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentOutcome {
    Accepted,
    Removed,
    AlreadyAbsent,
}

/// What the scheduler reports for a deployed configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub instances: u32,
    pub tasks_running: u32,
    pub tasks_staged: u32,
    pub tasks_healthy: u32,
    pub tasks_unhealthy: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub namespace: String,
    pub name: String,
    /// `namespace/name`, as reported by the lookup service.
    pub image_name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub latest_version: Option<String>,
    pub layer_count: Option<u32>,
    pub download_size: Option<u64>,
    pub labels: BTreeMap<String, String>,
}

/// `[registry/][namespace/]name[:tag][@digest]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    pub registry: Option<String>,
    pub namespace: String,
    pub name: String,
    pub tag: Option<String>,
}

impl ImageReference {
    const DEFAULT_NAMESPACE: &'static str = "library";

    pub fn parse(image: &str) -> Option<Self> {
        let image = image.trim();
        let image = image.split('@').next().unwrap_or(image);
        if image.is_empty() {
            return None;
        }

        let mut segments: Vec<&str> = image.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }
        let registry = if segments.len() > 1 && looks_like_registry(segments[0]) {
            Some(segments.remove(0).to_string())
        } else {
            None
        };

        let last = segments.pop()?;
        let (name, tag) = match last.split_once(':') {
            Some((name, tag)) if !name.is_empty() && !tag.is_empty() => {
                (name.to_string(), Some(tag.to_string()))
            }
            Some(_) => return None,
            None => (last.to_string(), None),
        };
        let namespace = if segments.is_empty() {
            Self::DEFAULT_NAMESPACE.to_string()
        } else {
            segments.join("/")
        };

        Some(Self {
            registry,
            namespace,
            name,
            tag,
        })
    }
}

fn looks_like_registry(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}
