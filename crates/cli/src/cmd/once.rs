//! Render the artifact once and exit

use anyhow::{Context, Result};
use cli_lib::args::GlobalArgs;
use cli_lib::{Output, Pipeline};
use std::sync::Arc;
use tally_docker::DockerInventory;
use tally_render::TemplateRenderer;

pub async fn run(args: &GlobalArgs) -> Result<()> {
    let config = args.resolve()?;

    let docker = tally_docker::connect(config.docker_host.as_deref())
        .await
        .context("Failed to set up Docker client")?;
    let renderer = TemplateRenderer::load(&config.template, Arc::new(DockerInventory::new(docker)))?;
    let output = Output::open(config.output_path())?;

    Pipeline::new(renderer, output).render_startup().await?;
    Ok(())
}
