use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::error;
use serde_json::json;

use crate::domain::{
    self,
    error::DomainError,
    model::{Application, ApplicationId, ConfigurationId, ContainerId},
    MarackerService,
};

use super::payload::{
    application_draft, configuration_draft, container_draft, patched_application,
    patched_configuration, patched_container, ApplicationPatch, ApplicationPayload,
    ApplicationView, ConfigurationPatch, ConfigurationPayload, ConfigurationView, ContainerPatch,
    ContainerPayload, ContainerView, DeploymentView, StandaloneConfigurationPayload, StatusView,
};

type Service = State<Arc<MarackerService>>;

pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid"),
            DomainError::NameTaken(_) => (StatusCode::BAD_REQUEST, "name_taken"),
            DomainError::SchedulerRejected { .. } => (StatusCode::BAD_REQUEST, "scheduler_rejected"),
            DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::SchedulerUnreachable(_) => (StatusCode::BAD_GATEWAY, "scheduler_unreachable"),
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({"code": code, "message": self.0.to_string()}))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(service: MarackerService) -> Router {
    Router::new()
        .route("/apps", get(list_applications).post(create_application))
        .route(
            "/apps/:id",
            get(show_application)
                .put(update_application)
                .patch(patch_application)
                .delete(destroy_application),
        )
        .route(
            "/apps/by-name/:name",
            get(show_application_by_name)
                .put(update_application_by_name)
                .patch(patch_application_by_name)
                .delete(destroy_application_by_name),
        )
        .route(
            "/containers/:id",
            get(show_container)
                .put(update_container)
                .patch(patch_container)
                .delete(destroy_container),
        )
        .route("/configs", post(create_configuration))
        .route(
            "/configs/:id",
            get(show_configuration)
                .put(update_configuration)
                .patch(patch_configuration)
                .delete(destroy_configuration),
        )
        .route("/configs/:id/deploy", post(deploy))
        .route("/configs/:id/delete", post(undeploy))
        .route("/configs/:id/status", get(deployment_status))
        .route("/images/:namespace/:image", get(show_image))
        .with_state(Arc::new(service))
}

async fn detailed(service: &MarackerService, application: Application) -> ApplicationView {
    let metadata = domain::application_image_metadata(service, &application).await;
    ApplicationView::new(application, metadata)
}

async fn list_applications(State(service): Service) -> ApiResult<Json<Vec<ApplicationView>>> {
    let applications = domain::list_applications(&service).await?;
    Ok(Json(applications.into_iter().map(ApplicationView::from).collect()))
}

async fn create_application(
    State(service): Service,
    Json(payload): Json<ApplicationPayload>,
) -> ApiResult<impl IntoResponse> {
    let application = domain::create_application(&service, application_draft(payload)?).await?;
    Ok((StatusCode::CREATED, Json(detailed(&service, application).await)))
}

async fn show_application(
    State(service): Service,
    Path(id): Path<ApplicationId>,
) -> ApiResult<Json<ApplicationView>> {
    let application = domain::get_application(&service, id).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn update_application(
    State(service): Service,
    Path(id): Path<ApplicationId>,
    Json(payload): Json<ApplicationPayload>,
) -> ApiResult<Json<ApplicationView>> {
    let application = domain::update_application(&service, id, application_draft(payload)?).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn patch_application(
    State(service): Service,
    Path(id): Path<ApplicationId>,
    Json(patch): Json<ApplicationPatch>,
) -> ApiResult<Json<ApplicationView>> {
    let current = domain::get_application(&service, id).await?;
    let draft = patched_application(&current, patch)?;
    let application = domain::update_application(&service, id, draft).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn destroy_application(
    State(service): Service,
    Path(id): Path<ApplicationId>,
) -> ApiResult<StatusCode> {
    domain::delete_application(&service, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn show_application_by_name(
    State(service): Service,
    Path(name): Path<String>,
) -> ApiResult<Json<ApplicationView>> {
    let application = domain::get_application_by_name(&service, &name).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn update_application_by_name(
    State(service): Service,
    Path(name): Path<String>,
    Json(payload): Json<ApplicationPayload>,
) -> ApiResult<Json<ApplicationView>> {
    let current = domain::get_application_by_name(&service, &name).await?;
    let application =
        domain::update_application(&service, current.id, application_draft(payload)?).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn patch_application_by_name(
    State(service): Service,
    Path(name): Path<String>,
    Json(patch): Json<ApplicationPatch>,
) -> ApiResult<Json<ApplicationView>> {
    let current = domain::get_application_by_name(&service, &name).await?;
    let draft = patched_application(&current, patch)?;
    let application = domain::update_application(&service, current.id, draft).await?;
    Ok(Json(detailed(&service, application).await))
}

async fn destroy_application_by_name(
    State(service): Service,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    let current = domain::get_application_by_name(&service, &name).await?;
    domain::delete_application(&service, current.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn show_container(
    State(service): Service,
    Path(id): Path<ContainerId>,
) -> ApiResult<Json<ContainerView>> {
    Ok(Json(domain::get_container(&service, id).await?.into()))
}

async fn update_container(
    State(service): Service,
    Path(id): Path<ContainerId>,
    Json(payload): Json<ContainerPayload>,
) -> ApiResult<Json<ContainerView>> {
    let container = domain::update_container(&service, id, container_draft(payload)?).await?;
    Ok(Json(container.into()))
}

async fn patch_container(
    State(service): Service,
    Path(id): Path<ContainerId>,
    Json(patch): Json<ContainerPatch>,
) -> ApiResult<Json<ContainerView>> {
    let current = domain::get_container(&service, id).await?;
    let container =
        domain::update_container(&service, id, patched_container(&current, patch)?).await?;
    Ok(Json(container.into()))
}

async fn destroy_container(
    State(service): Service,
    Path(id): Path<ContainerId>,
) -> ApiResult<StatusCode> {
    domain::delete_container(&service, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_configuration(
    State(service): Service,
    Json(payload): Json<StandaloneConfigurationPayload>,
) -> ApiResult<impl IntoResponse> {
    let configuration = domain::create_configuration(
        &service,
        payload.application,
        configuration_draft(payload.configuration)?,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(ConfigurationView::from(configuration))))
}

async fn show_configuration(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
) -> ApiResult<Json<ConfigurationView>> {
    Ok(Json(domain::get_configuration(&service, id).await?.into()))
}

async fn update_configuration(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
    Json(payload): Json<ConfigurationPayload>,
) -> ApiResult<Json<ConfigurationView>> {
    let configuration =
        domain::update_configuration(&service, id, configuration_draft(payload)?).await?;
    Ok(Json(configuration.into()))
}

async fn patch_configuration(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
    Json(patch): Json<ConfigurationPatch>,
) -> ApiResult<Json<ConfigurationView>> {
    let current = domain::get_configuration(&service, id).await?;
    let configuration =
        domain::update_configuration(&service, id, patched_configuration(&current, patch)?).await?;
    Ok(Json(configuration.into()))
}

async fn destroy_configuration(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
) -> ApiResult<StatusCode> {
    domain::delete_configuration(&service, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn deploy(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
) -> ApiResult<Json<DeploymentView>> {
    let (outcome, configuration) = domain::deploy_configuration(&service, id).await?;
    Ok(Json(DeploymentView::new(outcome, configuration)))
}

async fn undeploy(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
) -> ApiResult<Json<DeploymentView>> {
    let (outcome, configuration) = domain::delete_deployment(&service, id).await?;
    Ok(Json(DeploymentView::new(outcome, configuration)))
}

async fn deployment_status(
    State(service): Service,
    Path(id): Path<ConfigurationId>,
) -> ApiResult<Json<StatusView>> {
    let status = domain::deployment_status(&service, id).await?;
    let configuration = domain::get_configuration(&service, id).await?;
    Ok(Json(StatusView {
        deployed: status.is_some(),
        status,
        configuration: configuration.into(),
    }))
}

async fn show_image(
    State(service): Service,
    Path((namespace, image)): Path<(String, String)>,
) -> impl IntoResponse {
    match domain::lookup_image(&service, Some(namespace.as_str()), Some(image.as_str())).await {
        Some(metadata) => Json(metadata).into_response(),
        None => ApiError(DomainError::not_found(format!("Image {}/{}", namespace, image)))
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::PortExposureConfig;
    use crate::domain::tests::{service, service_with, FakeScheduler};

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn creates_command_app() {
        let app = router(service());
        let (status, body) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "my-cmd-app", "description": "be careful it's dangerous", "command": "env"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["command"], json!("env"));
        assert_eq!(body["docker_container"], Value::Null);
    }

    #[tokio::test]
    async fn rejects_duplicate_names() {
        let app = router(service());
        let redis = json!({
            "name": "redis",
            "description": "Redis container",
            "docker_container": {"image": "library/redis"},
        });
        assert_eq!(call(&app, Method::POST, "/apps", Some(redis)).await.0, StatusCode::CREATED);

        let mut exposed = json!({
            "name": "redis",
            "description": "Redis container",
            "docker_container": {"image": "library/redis", "ports": [6539]},
        });
        let (status, body) = call(&app, Method::POST, "/apps", Some(exposed.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("name_taken"));

        exposed["name"] = json!("redis-database");
        assert_eq!(call(&app, Method::POST, "/apps", Some(exposed)).await.0, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn enforces_port_exposure_policy_when_configured() {
        let app = router(service_with(
            FakeScheduler::default(),
            PortExposureConfig {
                suffixes: vec!["-database".to_string()],
            },
        ));
        let (status, body) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "redis", "docker_container": {"image": "redis", "ports": [6379]}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("invalid"));
    }

    #[tokio::test]
    async fn creates_nested_configurations() {
        let app = router(service());
        let (status, body) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({
                "name": "hello-world",
                "command": "echo $MESSAGE",
                "marathon_configs": [
                    {"env_vars": {"MESSAGE": "Hello"}},
                    {"cpu": 0.1, "memory": 32, "env_vars": {"MESSAGE": "Hola"}}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["marathon_configs"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["marathon_configs"][0]["memory"], json!(128));
    }

    #[tokio::test]
    async fn updates_app_from_its_own_representation() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({
                "name": "database",
                "docker_container": {"image": "postgres"},
                "marathon_configs": [{"cpu": 0.5, "memory": 512}]
            })),
        )
        .await;
        let uri = format!("/apps/{}", created["id"]);
        let (status, mut data) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        data["name"] = json!("redis");
        data["docker_container"] = json!({"image": "redis", "ports": [6379]});
        data["marathon_configs"]
            .as_array_mut()
            .unwrap()
            .push(json!({"cpus": 1.0, "memory": 256, "env_vars": {"hostname": "http://www.example.com"}}));
        let (status, updated) = call(&app, Method::PUT, &uri, Some(data)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["marathon_configs"].as_array().map(Vec::len), Some(2));
        assert_eq!(updated["docker_container"]["image"], json!("redis"));
        assert_eq!(updated["image_metadata"]["image_name"], json!("library/redis"));
    }

    #[tokio::test]
    async fn looks_up_and_deletes_by_name() {
        let app = router(service());
        call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "database", "docker_container": {"image": "postgres"}})),
        )
        .await;

        let (status, body) = call(&app, Method::GET, "/apps/by-name/database", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("database"));

        let (status, _) = call(&app, Method::DELETE, "/apps/by-name/database", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::GET, "/apps/by-name/database", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_app_removes_owned_records() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({
                "name": "redis",
                "docker_container": {"image": "redis"},
                "marathon_configs": [{"cpu": 0.3, "memory": 128}]
            })),
        )
        .await;
        let container = format!("/containers/{}", created["docker_container"]["id"]);
        let configuration = format!("/configs/{}", created["marathon_configs"][0]["id"]);
        assert_eq!(call(&app, Method::GET, &container, None).await.0, StatusCode::OK);

        let uri = format!("/apps/{}", created["id"]);
        assert_eq!(call(&app, Method::DELETE, &uri, None).await.0, StatusCode::NO_CONTENT);

        assert_eq!(call(&app, Method::GET, &uri, None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(&app, Method::GET, &container, None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(call(&app, Method::GET, &configuration, None).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deploys_and_tears_down_configuration() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "sleepy command", "command": "sleep 7324"})),
        )
        .await;
        let (status, configuration) = call(
            &app,
            Method::POST,
            "/configs",
            Some(json!({"maracker_app": created["id"], "cpu": 0.3, "memory": 128})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = &configuration["id"];

        let (status, body) = call(&app, Method::POST, &format!("/configs/{}/deploy", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["configuration"]["memory"], json!(128));

        let (_, body) = call(&app, Method::GET, &format!("/configs/{}/status", id), None).await;
        assert_eq!(body["deployed"], json!(true));

        for outcome in ["removed", "already_absent"] {
            let (status, body) = call(&app, Method::POST, &format!("/configs/{}/delete", id), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], json!(true));
            assert_eq!(body["outcome"], json!(outcome));
        }
    }

    #[tokio::test]
    async fn deploy_of_unknown_configuration_is_not_found() {
        let app = router(service());
        let (status, body) = call(&app, Method::POST, "/configs/404/deploy", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("not_found"));
    }

    #[tokio::test]
    async fn rejects_zero_memory() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "sleepy", "command": "sleep 1"})),
        )
        .await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/configs",
            Some(json!({"maracker_app": created["id"], "cpu": 0.3, "memory": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patches_application_fields() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({
                "name": "sleepy",
                "command": "sleep 1",
                "marathon_configs": [{"cpu": 0.3, "memory": 64}]
            })),
        )
        .await;
        let uri = format!("/apps/{}", created["id"]);

        let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({"description": "changed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], json!("sleepy"));
        assert_eq!(body["description"], json!("changed"));
        assert_eq!(body["command"], json!("sleep 1"));
        assert_eq!(body["marathon_configs"][0]["memory"], json!(64));

        let configuration = created["marathon_configs"][0]["id"].clone();
        let (status, body) = call(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({"marathon_configs": [{"id": configuration, "memory": 256}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["marathon_configs"][0]["memory"], json!(256));
        assert_eq!(body["marathon_configs"][0]["cpu"], json!(0.3));

        let (status, _) = call(&app, Method::PATCH, "/apps/404", Some(json!({"description": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patches_application_by_name() {
        let app = router(service());
        call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "database", "docker_container": {"image": "postgres"}})),
        )
        .await;
        call(&app, Method::POST, "/apps", Some(json!({"name": "redis", "command": "redis-server"}))).await;

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/apps/by-name/database",
            Some(json!({"docker_container": {"ports": [5432]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["docker_container"]["image"], json!("postgres"));
        assert_eq!(body["docker_container"]["ports"], json!([5432]));

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/apps/by-name/database",
            Some(json!({"name": "redis"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("name_taken"));
    }

    #[tokio::test]
    async fn patches_container_under_exposure_policy() {
        let app = router(service_with(
            FakeScheduler::default(),
            PortExposureConfig {
                suffixes: vec!["-database".to_string()],
            },
        ));
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "redis-database", "docker_container": {"image": "redis", "ports": [6379]}})),
        )
        .await;
        let uri = format!("/containers/{}", created["docker_container"]["id"]);

        let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({"image": "redis:7"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image"], json!("redis:7"));
        assert_eq!(body["ports"], json!([6379]));

        let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({"ports": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("invalid"));

        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patches_configuration_sizing() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({
                "name": "hello-world",
                "command": "echo $MESSAGE",
                "marathon_configs": [{"cpu": 0.1, "memory": 32, "env_vars": {"MESSAGE": "Hola"}}]
            })),
        )
        .await;
        let uri = format!("/configs/{}", created["marathon_configs"][0]["id"]);

        let (status, body) = call(&app, Method::PATCH, &uri, Some(json!({"memory": 64}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["memory"], json!(64));
        assert_eq!(body["cpu"], json!(0.1));
        assert_eq!(body["env_vars"]["MESSAGE"], json!("Hola"));

        let (status, _) = call(&app, Method::PATCH, &uri, Some(json!({"cpu": 0.0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_deploy_is_rejected_by_scheduler() {
        let app = router(service());
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "sleepy", "command": "sleep 1", "marathon_configs": [{}]})),
        )
        .await;
        let uri = format!("/configs/{}/deploy", created["marathon_configs"][0]["id"]);
        assert_eq!(call(&app, Method::POST, &uri, None).await.0, StatusCode::OK);

        let (status, body) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("scheduler_rejected"));
        assert!(body["message"]
            .as_str()
            .is_some_and(|message| message.contains("already exists")));
    }

    #[tokio::test]
    async fn unreachable_scheduler_is_bad_gateway() {
        let app = router(service_with(
            FakeScheduler {
                unreachable: true,
                ..Default::default()
            },
            PortExposureConfig::default(),
        ));
        let (_, created) = call(
            &app,
            Method::POST,
            "/apps",
            Some(json!({"name": "sleepy", "command": "sleep 1", "marathon_configs": [{}]})),
        )
        .await;
        let uri = format!("/configs/{}/deploy", created["marathon_configs"][0]["id"]);
        let (status, body) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], json!("scheduler_unreachable"));
    }

    #[tokio::test]
    async fn image_metadata_endpoint() {
        let app = router(service());
        let (status, body) = call(&app, Method::GET, "/images/hbpmip/portal-backend", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["image_name"], json!("hbpmip/portal-backend"));

        let (status, _) = call(&app, Method::GET, "/images/toto/portal-backend", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
