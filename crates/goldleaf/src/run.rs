use std::path::Path;

use anyhow::{Context, Result};
use renderer::{Renderer, RendererConfig};
use showconfig::ShowConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

const DEFAULT_SURFACE: (u32, u32) = (1280, 720);

pub fn run(args: RunArgs) -> Result<()> {
    let requested_size = args
        .size
        .as_deref()
        .map(parse_surface_size)
        .transpose()?;

    if let Some(path) = args.still_export.as_deref() {
        let (width, height) = requested_size.unwrap_or(DEFAULT_SURFACE);
        renderer::export_still(path, width, height, args.still_time)?;
        return Ok(());
    }

    let paths = AppPaths::discover()?;
    let config_path = paths.resolve_config(args.config_path.as_deref());
    let config = load_config(&config_path)?;
    tracing::debug!(
        config = %config_path.display(),
        images = config.images.len(),
        pages = config.pages(),
        "resolved show config"
    );

    let images = backdrop::preload(&config.images);
    if images.loaded_count() == 0 {
        tracing::warn!("no background frames could be loaded; the backdrop will stay black");
    }

    let mut renderer_config = RendererConfig::new(images);
    renderer_config.surface_size = requested_size
        .or(config_window_size(&config))
        .unwrap_or(DEFAULT_SURFACE);
    renderer_config.pages = config.pages();
    renderer_config.target_fps = match args.fps {
        Some(fps) if fps > 0.0 => Some(fps),
        Some(_) => None,
        None => config.target_fps(),
    };
    renderer_config.constrained = args.constrained || config.window.constrained;

    tracing::info!(
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        fps = ?renderer_config.target_fps,
        constrained = renderer_config.constrained,
        "starting goldleaf presentation"
    );
    Renderer::new(renderer_config).run()
}

pub fn load_config(path: &Path) -> Result<ShowConfig> {
    ShowConfig::load(path)
        .with_context(|| format!("failed to load show config from {}", path.display()))
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn config_window_size(config: &ShowConfig) -> Option<(u32, u32)> {
    match (config.window.width, config.window.height) {
        (Some(width), Some(height)) => Some((width, height)),
        _ => None,
    }
}

pub fn parse_surface_size(input: &str) -> Result<(u32, u32)> {
    let trimmed = input.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1920x1080"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in surface size"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in surface size"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}
