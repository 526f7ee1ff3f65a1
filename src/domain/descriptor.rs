//! Translation of an application and one of its configurations into a
//! Marathon app definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};
use super::model::{Application, ApplicationId, ConfigurationId, DeploymentConfiguration, EnvVars};

pub const APPLICATION_LABEL: &str = "maracker.application";
pub const CONFIGURATION_LABEL: &str = "maracker.configuration";

/// Marathon app definition, sent as-is to `POST /v2/apps`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    pub cpus: f64,
    pub mem: f64,
    pub instances: u32,
    pub env: EnvVars,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<DescriptorContainer>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorContainer {
    #[serde(rename = "type")]
    pub kind: String,
    pub docker: DockerDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerDescriptor {
    pub image: String,
    pub network: String,
    pub port_mappings: Vec<PortMapping>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    /// 0 lets the agent pick a host port.
    pub host_port: u16,
    pub protocol: String,
}

impl DeploymentDescriptor {
    pub fn image(&self) -> Option<&str> {
        self.container
            .as_ref()
            .map(|container| container.docker.image.as_str())
    }

    pub fn ports(&self) -> Vec<u16> {
        self.container
            .as_ref()
            .map(|container| {
                container
                    .docker
                    .port_mappings
                    .iter()
                    .map(|mapping| mapping.container_port)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Scheduler identifier of a configuration: `/{group}/app-{application}/config-{configuration}`.
///
/// Built from numeric ids only so it survives application renames and never
/// collides between two configurations of the same application.
pub fn deployment_id(group: &str, application: ApplicationId, configuration: ConfigurationId) -> String {
    let group = group.trim_matches('/');
    if group.is_empty() {
        format!("/app-{}/config-{}", application, configuration)
    } else {
        format!("/{}/app-{}/config-{}", group, application, configuration)
    }
}

pub fn build_descriptor(
    group: &str,
    application: &Application,
    configuration: &DeploymentConfiguration,
) -> Result<DeploymentDescriptor> {
    if configuration.application_id != application.id {
        return Err(DomainError::validation(format!(
            "configuration {} does not belong to application {}",
            configuration.id, application.id
        )));
    }
    if application.command.is_none() && application.container.is_none() {
        return Err(DomainError::validation(format!(
            "application '{}' has neither a command nor a container",
            application.name
        )));
    }

    let container = application.container.as_ref().map(|spec| DescriptorContainer {
        kind: "DOCKER".to_string(),
        docker: DockerDescriptor {
            image: spec.image.clone(),
            network: "BRIDGE".to_string(),
            port_mappings: spec
                .ports
                .iter()
                .map(|port| PortMapping {
                    container_port: *port,
                    host_port: 0,
                    protocol: "tcp".to_string(),
                })
                .collect(),
        },
    });

    Ok(DeploymentDescriptor {
        id: deployment_id(group, application.id, configuration.id),
        cmd: application.command.clone(),
        cpus: configuration.cpu,
        mem: f64::from(configuration.memory),
        instances: 1,
        env: configuration.env_vars.clone(),
        container,
        labels: BTreeMap::from([
            (APPLICATION_LABEL.to_string(), application.name.clone()),
            (CONFIGURATION_LABEL.to_string(), configuration.id.to_string()),
        ]),
    })
}
