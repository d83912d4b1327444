//! Watch Docker events and keep the artifact up to date

use anyhow::{Context, Result};
use cli_lib::args::GlobalArgs;
use cli_lib::pipeline;
use cli_lib::{Output, Pipeline};
use std::sync::Arc;
use tally_docker::{DockerEvents, DockerInventory};
use tally_render::TemplateRenderer;
use tracing::info;

pub async fn run(args: &GlobalArgs) -> Result<()> {
    // 1. Resolve configuration
    let config = args.resolve()?;
    let policy = config.policy();

    // 2. Connect to the daemon
    let docker = tally_docker::connect(config.docker_host.as_deref())
        .await
        .context("Failed to set up Docker client")?;

    // 3. Parse the template and open the destination
    let inventory = Arc::new(DockerInventory::new(docker.clone()));
    let renderer = TemplateRenderer::load(&config.template, inventory)?;
    let output = Output::open(config.output_path())?;

    info!(
        template = %config.template.display(),
        quiet_period_ms = config.debounce.quiet_period_ms,
        max_wait_ms = config.debounce.max_wait_ms,
        "Starting tally"
    );

    // 4. Run until something fatal happens
    let source = DockerEvents::new(docker, config.filters.clone());
    let reason = pipeline::run(Pipeline::new(renderer, output), &source, policy).await;
    Err(reason.into())
}
