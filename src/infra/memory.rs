//! In-memory persistence. Every write takes the single lock once, so nested
//! application writes are all-or-nothing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    error::{DomainError, Result},
    model::{
        Application, ApplicationDraft, ApplicationId, ConfigurationDraft, ConfigurationId,
        ContainerDraft, ContainerId, ContainerSpec, DeploymentConfiguration,
    },
    port::ApplicationRepository,
};

#[derive(Clone, Debug)]
struct ApplicationRow {
    id: ApplicationId,
    name: String,
    description: String,
    command: Option<String>,
    container: Option<ContainerId>,
}

#[derive(Debug, Default)]
struct Records {
    last_id: u64,
    applications: BTreeMap<ApplicationId, ApplicationRow>,
    containers: BTreeMap<ContainerId, ContainerSpec>,
    configurations: BTreeMap<ConfigurationId, DeploymentConfiguration>,
}

impl Records {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn assemble(&self, row: &ApplicationRow) -> Application {
        Application {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            command: row.command.clone(),
            container: row
                .container
                .and_then(|container| self.containers.get(&container).cloned()),
            configurations: self
                .configurations
                .values()
                .filter(|configuration| configuration.application_id == row.id)
                .cloned()
                .collect(),
        }
    }

    fn name_taken(&self, name: &str, except: Option<ApplicationId>) -> bool {
        self.applications
            .values()
            .any(|row| row.name == name && Some(row.id) != except)
    }

    fn insert_container(&mut self, application: ApplicationId, draft: ContainerDraft) -> ContainerId {
        let id = self.next_id();
        self.containers.insert(
            id,
            ContainerSpec {
                id,
                application_id: application,
                image: draft.image,
                ports: draft.ports,
            },
        );
        id
    }

    fn insert_configuration(
        &mut self,
        application: ApplicationId,
        draft: ConfigurationDraft,
    ) -> DeploymentConfiguration {
        let id = self.next_id();
        let configuration = DeploymentConfiguration {
            id,
            application_id: application,
            cpu: draft.cpu,
            memory: draft.memory,
            env_vars: draft.env_vars,
        };
        self.configurations.insert(id, configuration.clone());
        configuration
    }
}

/// Ids are shared across record kinds and never reused.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: RwLock<Records>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryRepository {
    async fn list(&self) -> Result<Vec<Application>> {
        let records = self.records.read().await;
        Ok(records
            .applications
            .values()
            .map(|row| records.assemble(row))
            .collect())
    }

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>> {
        let records = self.records.read().await;
        Ok(records.applications.get(&id).map(|row| records.assemble(row)))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Application>> {
        let records = self.records.read().await;
        Ok(records
            .applications
            .values()
            .find(|row| row.name == name)
            .map(|row| records.assemble(row)))
    }

    async fn create(&self, draft: ApplicationDraft) -> Result<Application> {
        let mut records = self.records.write().await;
        if records.name_taken(&draft.name, None) {
            return Err(DomainError::NameTaken(draft.name));
        }

        let id = records.next_id();
        let container = draft
            .container
            .map(|container| records.insert_container(id, container));
        for configuration in draft.configurations {
            records.insert_configuration(id, configuration);
        }
        let row = ApplicationRow {
            id,
            name: draft.name,
            description: draft.description,
            command: draft.command,
            container,
        };
        let application = records.assemble(&row);
        records.applications.insert(id, row);
        Ok(application)
    }

    async fn update(&self, id: ApplicationId, draft: ApplicationDraft) -> Result<Option<Application>> {
        let mut records = self.records.write().await;
        let Some(mut row) = records.applications.get(&id).cloned() else {
            return Ok(None);
        };
        if records.name_taken(&draft.name, Some(id)) {
            return Err(DomainError::NameTaken(draft.name));
        }
        // Check every referenced configuration before touching anything.
        for configuration_id in draft.configurations.iter().filter_map(|c| c.id) {
            match records.configurations.get(&configuration_id) {
                Some(existing) if existing.application_id == id => {}
                _ => {
                    return Err(DomainError::validation(format!(
                        "configuration {} does not belong to application {}",
                        configuration_id, id
                    )))
                }
            }
        }

        row.container = match (row.container, draft.container) {
            (Some(container), Some(replacement)) => {
                if let Some(existing) = records.containers.get_mut(&container) {
                    existing.image = replacement.image;
                    existing.ports = replacement.ports;
                }
                Some(container)
            }
            (None, Some(container)) => Some(records.insert_container(id, container)),
            (Some(container), None) => {
                records.containers.remove(&container);
                None
            }
            (None, None) => None,
        };
        for configuration in draft.configurations {
            match configuration.id.and_then(|cid| records.configurations.get_mut(&cid)) {
                Some(existing) => {
                    existing.cpu = configuration.cpu;
                    existing.memory = configuration.memory;
                    existing.env_vars = configuration.env_vars;
                }
                None => {
                    records.insert_configuration(id, configuration);
                }
            }
        }
        row.name = draft.name;
        row.description = draft.description;
        row.command = draft.command;

        let application = records.assemble(&row);
        records.applications.insert(id, row);
        Ok(Some(application))
    }

    async fn delete(&self, id: ApplicationId) -> Result<bool> {
        let mut records = self.records.write().await;
        let Some(row) = records.applications.remove(&id) else {
            return Ok(false);
        };
        if let Some(container) = row.container {
            records.containers.remove(&container);
        }
        records
            .configurations
            .retain(|_, configuration| configuration.application_id != id);
        Ok(true)
    }

    async fn get_container(&self, id: ContainerId) -> Result<Option<ContainerSpec>> {
        Ok(self.records.read().await.containers.get(&id).cloned())
    }

    async fn update_container(&self, id: ContainerId, draft: ContainerDraft) -> Result<Option<ContainerSpec>> {
        let mut records = self.records.write().await;
        Ok(records.containers.get_mut(&id).map(|container| {
            container.image = draft.image;
            container.ports = draft.ports;
            container.clone()
        }))
    }

    async fn delete_container(&self, id: ContainerId) -> Result<bool> {
        let mut records = self.records.write().await;
        let Some(container) = records.containers.remove(&id) else {
            return Ok(false);
        };
        if let Some(owner) = records.applications.get_mut(&container.application_id) {
            owner.container = None;
        }
        Ok(true)
    }

    async fn get_configuration(&self, id: ConfigurationId) -> Result<Option<DeploymentConfiguration>> {
        Ok(self.records.read().await.configurations.get(&id).cloned())
    }

    async fn create_configuration(
        &self,
        application: ApplicationId,
        draft: ConfigurationDraft,
    ) -> Result<DeploymentConfiguration> {
        let mut records = self.records.write().await;
        if !records.applications.contains_key(&application) {
            return Err(DomainError::not_found(format!("Application {}", application)));
        }
        Ok(records.insert_configuration(application, draft))
    }

    async fn update_configuration(
        &self,
        id: ConfigurationId,
        draft: ConfigurationDraft,
    ) -> Result<Option<DeploymentConfiguration>> {
        let mut records = self.records.write().await;
        Ok(records.configurations.get_mut(&id).map(|configuration| {
            configuration.cpu = draft.cpu;
            configuration.memory = draft.memory;
            configuration.env_vars = draft.env_vars;
            configuration.clone()
        }))
    }

    async fn delete_configuration(&self, id: ConfigurationId) -> Result<bool> {
        Ok(self.records.write().await.configurations.remove(&id).is_some())
    }
}
