use anyhow::Context;
use log::info;
use tokio::net::TcpListener;

use crate::config::load_config;
use crate::domain::{validation::PortExposurePolicy, MarackerService};
use crate::infra::{
    marathon::MarathonClient, memory::InMemoryRepository, microbadger::MicrobadgerClient,
    web::router,
};

mod config;
mod domain;
mod infra;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    info!("Loaded config {:?}", config);

    let service = MarackerService {
        repository: Box::new(InMemoryRepository::new()),
        scheduler: Box::new(MarathonClient::new(&config.marathon)?),
        image_lookup: Box::new(MicrobadgerClient::new(&config.microbadger)?),
        exposure_policy: PortExposurePolicy::new(&config.port_exposure),
        deployment_group: config.marathon.group.clone(),
    };

    let listener = TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("Can't listen on {}", config.listen_address))?;
    info!(
        "Maracker listening on {}, deploying to {}",
        config.listen_address, config.marathon.url
    );
    axum::serve(listener, router(service)).await?;
    Ok(())
}
