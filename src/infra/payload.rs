//! Wire representations of records and their mapping to domain drafts.

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::{DomainError, Result},
    model::{
        Application, ApplicationDraft, ApplicationId, ConfigurationDraft, ConfigurationId,
        ContainerDraft, ContainerId, ContainerSpec, DeploymentConfiguration, DeploymentOutcome,
        DeploymentStatus, EnvVars, ImageMetadata,
    },
};

pub const DEFAULT_CPU: f64 = 1.0;
pub const DEFAULT_MEMORY: u32 = 128;

#[derive(Debug, Deserialize)]
pub struct ApplicationPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub docker_container: Option<ContainerPayload>,
    #[serde(default)]
    pub marathon_configs: Vec<ConfigurationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ContainerPayload {
    pub image: String,
    #[serde(default)]
    pub ports: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ConfigurationPayload {
    #[serde(default)]
    pub id: Option<ConfigurationId>,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory: Option<i64>,
    #[serde(default)]
    pub env_vars: EnvVars,
}

/// Partial application update: absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub docker_container: Option<ContainerPatch>,
    #[serde(default)]
    pub marathon_configs: Vec<ConfigurationPatch>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContainerPatch {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ports: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigurationPatch {
    #[serde(default)]
    pub id: Option<ConfigurationId>,
    #[serde(default)]
    pub cpu: Option<f64>,
    #[serde(default)]
    pub memory: Option<i64>,
    #[serde(default)]
    pub env_vars: Option<EnvVars>,
}

/// Configuration created on its own, outside of an application payload.
#[derive(Debug, Deserialize)]
pub struct StandaloneConfigurationPayload {
    #[serde(alias = "maracker_app")]
    pub application: ApplicationId,
    #[serde(flatten)]
    pub configuration: ConfigurationPayload,
}

pub fn application_draft(payload: ApplicationPayload) -> Result<ApplicationDraft> {
    Ok(ApplicationDraft {
        name: payload.name.trim().to_string(),
        description: payload.description.unwrap_or_default(),
        command: payload.command.filter(|command| !command.is_empty()),
        container: payload.docker_container.map(container_draft).transpose()?,
        configurations: payload
            .marathon_configs
            .into_iter()
            .map(configuration_draft)
            .collect::<Result<Vec<_>>>()?,
    })
}

pub fn container_draft(payload: ContainerPayload) -> Result<ContainerDraft> {
    Ok(ContainerDraft {
        image: payload.image.trim().to_string(),
        ports: ports(payload.ports)?,
    })
}

fn ports(ports: Vec<i64>) -> Result<Vec<u16>> {
    ports
        .into_iter()
        .map(|port| match u16::try_from(port) {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(DomainError::validation(format!(
                "{} is not a valid network port",
                port
            ))),
        })
        .collect()
}

fn memory(memory: i64) -> Result<u32> {
    u32::try_from(memory).map_err(|_| {
        if memory > 0 {
            DomainError::validation(format!(
                "memory {} is out of range, at most {} MB",
                memory,
                u32::MAX
            ))
        } else {
            DomainError::validation(format!("memory must be strictly positive, got {}", memory))
        }
    })
}

pub fn configuration_draft(payload: ConfigurationPayload) -> Result<ConfigurationDraft> {
    Ok(ConfigurationDraft {
        id: payload.id,
        cpu: payload.cpu.unwrap_or(DEFAULT_CPU),
        memory: payload.memory.map(memory).transpose()?.unwrap_or(DEFAULT_MEMORY),
        env_vars: payload.env_vars,
    })
}

/// Applies `patch` over the stored application. Nested configurations are
/// merged over the configuration they name, or created when they carry no id.
pub fn patched_application(current: &Application, patch: ApplicationPatch) -> Result<ApplicationDraft> {
    let container = match (patch.docker_container, &current.container) {
        (Some(container), Some(existing)) => Some(patched_container(existing, container)?),
        (Some(container), None) => Some(ContainerDraft {
            image: container.image.unwrap_or_default().trim().to_string(),
            ports: ports(container.ports.unwrap_or_default())?,
        }),
        (None, existing) => existing.as_ref().map(|existing| ContainerDraft {
            image: existing.image.clone(),
            ports: existing.ports.clone(),
        }),
    };
    let configurations = patch
        .marathon_configs
        .into_iter()
        .map(|configuration| match configuration.id.and_then(|id| current.configuration(id)) {
            Some(existing) => patched_configuration(existing, configuration),
            None => configuration_draft(ConfigurationPayload {
                id: configuration.id,
                cpu: configuration.cpu,
                memory: configuration.memory,
                env_vars: configuration.env_vars.unwrap_or_default(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(ApplicationDraft {
        name: patch
            .name
            .map(|name| name.trim().to_string())
            .unwrap_or_else(|| current.name.clone()),
        description: patch.description.unwrap_or_else(|| current.description.clone()),
        command: match patch.command {
            Some(command) => Some(command).filter(|command| !command.is_empty()),
            None => current.command.clone(),
        },
        container,
        configurations,
    })
}

pub fn patched_container(current: &ContainerSpec, patch: ContainerPatch) -> Result<ContainerDraft> {
    Ok(ContainerDraft {
        image: patch
            .image
            .map(|image| image.trim().to_string())
            .unwrap_or_else(|| current.image.clone()),
        ports: match patch.ports {
            Some(requested) => ports(requested)?,
            None => current.ports.clone(),
        },
    })
}

pub fn patched_configuration(
    current: &DeploymentConfiguration,
    patch: ConfigurationPatch,
) -> Result<ConfigurationDraft> {
    Ok(ConfigurationDraft {
        id: Some(current.id),
        cpu: patch.cpu.unwrap_or(current.cpu),
        memory: patch.memory.map(memory).transpose()?.unwrap_or(current.memory),
        env_vars: patch.env_vars.unwrap_or_else(|| current.env_vars.clone()),
    })
}

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub description: String,
    pub command: Option<String>,
    pub docker_container: Option<ContainerView>,
    pub marathon_configs: Vec<ConfigurationView>,
    pub image_metadata: Option<ImageMetadata>,
}

#[derive(Debug, Serialize)]
pub struct ContainerView {
    pub id: ContainerId,
    pub maracker_app: ApplicationId,
    pub image: String,
    pub ports: Vec<u16>,
}

#[derive(Debug, Serialize)]
pub struct ConfigurationView {
    pub id: ConfigurationId,
    pub maracker_app: ApplicationId,
    pub cpu: f64,
    pub memory: u32,
    pub env_vars: EnvVars,
}

#[derive(Debug, Serialize)]
pub struct DeploymentView {
    pub success: bool,
    pub outcome: DeploymentOutcome,
    pub configuration: ConfigurationView,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub deployed: bool,
    pub status: Option<DeploymentStatus>,
    pub configuration: ConfigurationView,
}

impl ApplicationView {
    pub fn new(application: Application, image_metadata: Option<ImageMetadata>) -> Self {
        Self {
            id: application.id,
            name: application.name,
            description: application.description,
            command: application.command,
            docker_container: application.container.map(ContainerView::from),
            marathon_configs: application
                .configurations
                .into_iter()
                .map(ConfigurationView::from)
                .collect(),
            image_metadata,
        }
    }
}

impl From<Application> for ApplicationView {
    fn from(application: Application) -> Self {
        Self::new(application, None)
    }
}

impl From<ContainerSpec> for ContainerView {
    fn from(container: ContainerSpec) -> Self {
        Self {
            id: container.id,
            maracker_app: container.application_id,
            image: container.image,
            ports: container.ports,
        }
    }
}

impl From<DeploymentConfiguration> for ConfigurationView {
    fn from(configuration: DeploymentConfiguration) -> Self {
        Self {
            id: configuration.id,
            maracker_app: configuration.application_id,
            cpu: configuration.cpu,
            memory: configuration.memory,
            env_vars: configuration.env_vars,
        }
    }
}

impl DeploymentView {
    pub fn new(outcome: DeploymentOutcome, configuration: DeploymentConfiguration) -> Self {
        Self {
            success: true,
            outcome,
            configuration: configuration.into(),
        }
    }
}
