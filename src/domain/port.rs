use async_trait::async_trait;

use super::descriptor::DeploymentDescriptor;
use super::error::Result;
use super::model::{
    Application, ApplicationDraft, ApplicationId, ConfigurationDraft, ConfigurationId,
    ContainerDraft, ContainerId, ContainerSpec, DeploymentConfiguration, DeploymentOutcome,
    DeploymentStatus, ImageMetadata,
};

/// Durable storage of applications and the records they own.
///
/// Writes touching an application and its nested records are atomic, and
/// deleting an application removes its container and configurations.
#[async_trait]
pub trait ApplicationRepository {
    async fn list(&self) -> Result<Vec<Application>>;

    async fn get(&self, id: ApplicationId) -> Result<Option<Application>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Application>>;

    async fn create(&self, draft: ApplicationDraft) -> Result<Application>;

    async fn update(&self, id: ApplicationId, draft: ApplicationDraft) -> Result<Option<Application>>;

    async fn delete(&self, id: ApplicationId) -> Result<bool>;

    async fn get_container(&self, id: ContainerId) -> Result<Option<ContainerSpec>>;

    async fn update_container(&self, id: ContainerId, draft: ContainerDraft) -> Result<Option<ContainerSpec>>;

    async fn delete_container(&self, id: ContainerId) -> Result<bool>;

    async fn get_configuration(&self, id: ConfigurationId) -> Result<Option<DeploymentConfiguration>>;

    async fn create_configuration(
        &self,
        application: ApplicationId,
        draft: ConfigurationDraft,
    ) -> Result<DeploymentConfiguration>;

    async fn update_configuration(
        &self,
        id: ConfigurationId,
        draft: ConfigurationDraft,
    ) -> Result<Option<DeploymentConfiguration>>;

    async fn delete_configuration(&self, id: ConfigurationId) -> Result<bool>;
}

/// Remote orchestration API.
#[async_trait]
pub trait Scheduler {
    /// Resolves once the scheduler acknowledged the deployment.
    async fn submit(&self, descriptor: &DeploymentDescriptor) -> Result<DeploymentOutcome>;

    /// Removing an unknown deployment yields `DeploymentOutcome::AlreadyAbsent`.
    async fn remove(&self, deployment_id: &str) -> Result<DeploymentOutcome>;

    async fn status(&self, deployment_id: &str) -> Result<Option<DeploymentStatus>>;
}

/// Best-effort image enrichment. Never fails: anything but a hit is `None`.
#[async_trait]
pub trait ImageMetadataLookup {
    async fn lookup(&self, namespace: Option<&str>, image: Option<&str>) -> Option<ImageMetadata>;
}
