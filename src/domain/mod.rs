use log::{debug, info, warn};

use descriptor::{build_descriptor, deployment_id};
use error::{DomainError, Result};
use model::{
    Application, ApplicationDraft, ApplicationId, ConfigurationDraft, ConfigurationId,
    ContainerDraft, ContainerId, ContainerSpec, DeploymentConfiguration, DeploymentOutcome,
    DeploymentStatus, ImageMetadata, ImageReference,
};
use port::{ApplicationRepository, ImageMetadataLookup, Scheduler};
use validation::{validate_application, validate_configuration, validate_container, PortExposurePolicy};

pub mod descriptor;
pub mod error;
pub mod model;
pub mod port;
pub mod validation;

pub struct MarackerService {
    pub repository: Box<dyn ApplicationRepository + 'static + Sync + Send>,
    pub scheduler: Box<dyn Scheduler + 'static + Sync + Send>,
    pub image_lookup: Box<dyn ImageMetadataLookup + 'static + Sync + Send>,
    pub exposure_policy: PortExposurePolicy,
    /// Marathon group deployments are placed under.
    pub deployment_group: String,
}

pub async fn list_applications(service: &MarackerService) -> Result<Vec<Application>> {
    service.repository.list().await
}

pub async fn get_application(service: &MarackerService, id: ApplicationId) -> Result<Application> {
    service
        .repository
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Application {}", id)))
}

pub async fn get_application_by_name(service: &MarackerService, name: &str) -> Result<Application> {
    service
        .repository
        .get_by_name(name)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Application '{}'", name)))
}

pub async fn create_application(
    service: &MarackerService,
    draft: ApplicationDraft,
) -> Result<Application> {
    validate_application(&draft, &service.exposure_policy)?;
    let application = service.repository.create(draft).await?;
    info!(
        "Application {} '{}' created with {} configuration(s)",
        application.id,
        application.name,
        application.configurations.len()
    );
    Ok(application)
}

pub async fn update_application(
    service: &MarackerService,
    id: ApplicationId,
    draft: ApplicationDraft,
) -> Result<Application> {
    validate_application(&draft, &service.exposure_policy)?;
    let application = service
        .repository
        .update(id, draft)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Application {}", id)))?;
    info!("Application {} '{}' updated", application.id, application.name);
    Ok(application)
}

/// Removes the application along with its container and configurations.
/// Deployments already running on the scheduler are left in place.
pub async fn delete_application(service: &MarackerService, id: ApplicationId) -> Result<()> {
    if !service.repository.delete(id).await? {
        return Err(DomainError::not_found(format!("Application {}", id)));
    }
    info!("Application {} deleted", id);
    Ok(())
}

pub async fn get_container(service: &MarackerService, id: ContainerId) -> Result<ContainerSpec> {
    service
        .repository
        .get_container(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Container {}", id)))
}

pub async fn update_container(
    service: &MarackerService,
    id: ContainerId,
    draft: ContainerDraft,
) -> Result<ContainerSpec> {
    validate_container(&draft)?;
    let current = get_container(service, id).await?;
    let owner = get_application(service, current.application_id).await?;
    service.exposure_policy.check(&owner.name, Some(&draft))?;
    service
        .repository
        .update_container(id, draft)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Container {}", id)))
}

/// Detaches the container from its application, provided the application may
/// go without exposed ports.
pub async fn delete_container(service: &MarackerService, id: ContainerId) -> Result<()> {
    let current = get_container(service, id).await?;
    let owner = get_application(service, current.application_id).await?;
    service.exposure_policy.check(&owner.name, None)?;
    if !service.repository.delete_container(id).await? {
        return Err(DomainError::not_found(format!("Container {}", id)));
    }
    Ok(())
}

pub async fn get_configuration(
    service: &MarackerService,
    id: ConfigurationId,
) -> Result<DeploymentConfiguration> {
    service
        .repository
        .get_configuration(id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Configuration {}", id)))
}

pub async fn create_configuration(
    service: &MarackerService,
    application: ApplicationId,
    draft: ConfigurationDraft,
) -> Result<DeploymentConfiguration> {
    validate_configuration(&draft)?;
    let configuration = service
        .repository
        .create_configuration(application, draft)
        .await?;
    info!(
        "Configuration {} created for application {}",
        configuration.id, application
    );
    Ok(configuration)
}

pub async fn update_configuration(
    service: &MarackerService,
    id: ConfigurationId,
    draft: ConfigurationDraft,
) -> Result<DeploymentConfiguration> {
    validate_configuration(&draft)?;
    service
        .repository
        .update_configuration(id, draft)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Configuration {}", id)))
}

pub async fn delete_configuration(service: &MarackerService, id: ConfigurationId) -> Result<()> {
    if !service.repository.delete_configuration(id).await? {
        return Err(DomainError::not_found(format!("Configuration {}", id)));
    }
    Ok(())
}

async fn resolve(
    service: &MarackerService,
    id: ConfigurationId,
) -> Result<(Application, DeploymentConfiguration)> {
    let configuration = get_configuration(service, id).await?;
    let application = get_application(service, configuration.application_id).await?;
    Ok((application, configuration))
}

/// Submits the configuration to the scheduler. Success means the scheduler
/// accepted the deployment, not that its tasks are running.
///
/// Concurrent deploy/delete calls for the same configuration are not
/// serialized here; the scheduler sees them in arrival order.
pub async fn deploy_configuration(
    service: &MarackerService,
    id: ConfigurationId,
) -> Result<(DeploymentOutcome, DeploymentConfiguration)> {
    let (application, configuration) = resolve(service, id).await?;
    let descriptor = build_descriptor(&service.deployment_group, &application, &configuration)?;
    debug!(
        "Descriptor {} (image {:?}, ports {:?}, cmd {:?})",
        descriptor.id,
        descriptor.image(),
        descriptor.ports(),
        descriptor.cmd
    );
    let outcome = service.scheduler.submit(&descriptor).await?;
    info!(
        "Configuration {} of '{}' deployed as {}",
        configuration.id, application.name, descriptor.id
    );
    Ok((outcome, configuration))
}

/// Tears the deployment down. Already-absent deployments count as removed.
pub async fn delete_deployment(
    service: &MarackerService,
    id: ConfigurationId,
) -> Result<(DeploymentOutcome, DeploymentConfiguration)> {
    let configuration = get_configuration(service, id).await?;
    let deployment = deployment_id(
        &service.deployment_group,
        configuration.application_id,
        configuration.id,
    );
    let outcome = service.scheduler.remove(&deployment).await?;
    match outcome {
        DeploymentOutcome::AlreadyAbsent => {
            warn!("Deployment {} was not present on the scheduler", deployment)
        }
        _ => info!("Deployment {} removed", deployment),
    }
    Ok((outcome, configuration))
}

pub async fn deployment_status(
    service: &MarackerService,
    id: ConfigurationId,
) -> Result<Option<DeploymentStatus>> {
    let configuration = get_configuration(service, id).await?;
    let deployment = deployment_id(
        &service.deployment_group,
        configuration.application_id,
        configuration.id,
    );
    service.scheduler.status(&deployment).await
}

pub async fn lookup_image(
    service: &MarackerService,
    namespace: Option<&str>,
    image: Option<&str>,
) -> Option<ImageMetadata> {
    service.image_lookup.lookup(namespace, image).await
}

/// Display metadata for a container-based application, if any can be found.
pub async fn application_image_metadata(
    service: &MarackerService,
    application: &Application,
) -> Option<ImageMetadata> {
    let container = application.container.as_ref()?;
    let reference = ImageReference::parse(&container.image)?;
    lookup_image(service, Some(reference.namespace.as_str()), Some(reference.name.as_str())).await
}
