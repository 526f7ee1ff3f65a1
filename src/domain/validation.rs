use itertools::Itertools;

use crate::config::PortExposureConfig;

use super::error::{DomainError, Result};
use super::model::{ApplicationDraft, ConfigurationDraft, ContainerDraft, ImageReference};

/// Name-based rule deciding which applications may expose container ports.
#[derive(Clone, Debug, Default)]
pub struct PortExposurePolicy {
    suffixes: Vec<String>,
}

impl PortExposurePolicy {
    pub fn new(config: &PortExposureConfig) -> Self {
        Self {
            suffixes: config
                .suffixes
                .iter()
                .map(|suffix| suffix.trim().to_string())
                .filter(|suffix| !suffix.is_empty())
                .collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.suffixes.is_empty()
    }

    fn requires_ports(&self, name: &str) -> bool {
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    pub fn check(&self, name: &str, container: Option<&ContainerDraft>) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let declares_ports = container.is_some_and(|container| !container.ports.is_empty());
        match (self.requires_ports(name), declares_ports) {
            (true, false) => Err(DomainError::validation(format!(
                "application '{}' must expose container ports",
                name
            ))),
            (false, true) => Err(DomainError::validation(format!(
                "application '{}' is not allowed to expose ports (name must end with one of: {})",
                name,
                self.suffixes.join(", ")
            ))),
            _ => Ok(()),
        }
    }
}

pub fn validate_application(draft: &ApplicationDraft, policy: &PortExposurePolicy) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(DomainError::validation("application name can't be empty"));
    }
    if let Some(command) = &draft.command {
        if command.trim().is_empty() {
            return Err(DomainError::validation("command can't be blank"));
        }
    }
    if let Some(container) = &draft.container {
        validate_container(container)?;
    }
    policy.check(&draft.name, draft.container.as_ref())?;
    draft
        .configurations
        .iter()
        .try_for_each(validate_configuration)
}

pub fn validate_container(container: &ContainerDraft) -> Result<()> {
    if ImageReference::parse(&container.image).is_none() {
        return Err(DomainError::validation(format!(
            "'{}' is not a valid image reference",
            container.image
        )));
    }
    if container.ports.contains(&0) {
        return Err(DomainError::validation("port 0 is not a valid network port"));
    }
    let duplicates: Vec<u16> = container.ports.iter().copied().duplicates().collect();
    if !duplicates.is_empty() {
        return Err(DomainError::validation(format!(
            "ports declared more than once: {}",
            duplicates.iter().join(", ")
        )));
    }
    Ok(())
}

pub fn validate_configuration(configuration: &ConfigurationDraft) -> Result<()> {
    if !configuration.cpu.is_finite() || configuration.cpu <= 0.0 {
        return Err(DomainError::validation(format!(
            "cpu must be strictly positive, got {}",
            configuration.cpu
        )));
    }
    if configuration.memory == 0 {
        return Err(DomainError::validation("memory must be strictly positive"));
    }
    if let Some(key) = configuration.env_vars.keys().find(|key| key.trim().is_empty()) {
        return Err(DomainError::validation(format!(
            "invalid environment variable name '{}'",
            key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EnvVars;

    fn configuration(cpu: f64, memory: u32) -> ConfigurationDraft {
        ConfigurationDraft {
            id: None,
            cpu,
            memory,
            env_vars: EnvVars::new(),
        }
    }

    fn redis(name: &str, ports: Vec<u16>) -> ApplicationDraft {
        ApplicationDraft {
            name: name.to_string(),
            description: "Redis container".to_string(),
            command: None,
            container: Some(ContainerDraft {
                image: "library/redis".to_string(),
                ports,
            }),
            configurations: vec![],
        }
    }

    #[test]
    fn resources_must_be_strictly_positive() {
        assert!(validate_configuration(&configuration(0.3, 128)).is_ok());
        for (cpu, memory) in [(0.0, 128), (-1.0, 128), (0.3, 0), (f64::NAN, 128)] {
            assert!(matches!(
                validate_configuration(&configuration(cpu, memory)),
                Err(DomainError::Validation(_))
            ));
        }
    }

    #[test]
    fn ports_must_be_valid_and_unique() {
        let policy = PortExposurePolicy::default();
        assert!(validate_application(&redis("redis", vec![80, 6379]), &policy).is_ok());
        assert!(validate_application(&redis("redis", vec![0]), &policy).is_err());
        assert_eq!(
            validate_application(&redis("redis", vec![80, 6379, 80]), &policy),
            Err(DomainError::validation("ports declared more than once: 80"))
        );
    }

    #[test]
    fn disabled_policy_accepts_any_ports() {
        let policy = PortExposurePolicy::new(&PortExposureConfig::default());
        assert!(!policy.is_enabled());
        assert!(validate_application(&redis("redis", vec![6379]), &policy).is_ok());
    }

    #[test]
    fn exposure_policy_follows_name_suffix() {
        let policy = PortExposurePolicy::new(&PortExposureConfig {
            suffixes: vec!["-database".to_string()],
        });
        assert!(validate_application(&redis("redis-database", vec![6379]), &policy).is_ok());
        assert!(validate_application(&redis("redis", vec![]), &policy).is_ok());
        assert!(validate_application(&redis("redis", vec![6379]), &policy).is_err());
        assert!(validate_application(&redis("redis-database", vec![]), &policy).is_err());
    }

    #[test]
    fn blank_name_and_image_are_rejected() {
        let policy = PortExposurePolicy::default();
        assert!(validate_application(&redis(" ", vec![]), &policy).is_err());

        let mut draft = redis("redis", vec![]);
        draft.container = Some(ContainerDraft {
            image: String::new(),
            ports: vec![],
        });
        assert!(validate_application(&draft, &policy).is_err());
    }

    #[test]
    fn nested_configurations_are_checked() {
        let mut draft = redis("redis", vec![]);
        draft.configurations = vec![configuration(1.0, 256), configuration(0.1, 0)];
        assert!(validate_application(&draft, &PortExposurePolicy::default()).is_err());
    }
}
