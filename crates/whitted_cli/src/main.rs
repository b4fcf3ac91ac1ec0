use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use whitted_core::load_scene;
use whitted_renderer::{render, RenderConfig, RenderWorld, Scene, Vec3};

mod cli;
mod compare;
mod logger;
mod output;

use cli::Args;
use compare::{compare_images, format_statistic, load_reference};
use logger::init_logger;
use output::{save_png, to_rgb_image};

fn main() -> Result<()> {
    let args = Args::parse();
    let level: LevelFilter = args.log_level.into();
    init_logger(level, args.debug_pixel().is_some());

    let config = load_config(&args)?;
    if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build_global()
            .context("Failed to configure the worker pool")?;
    }

    let description = load_scene(&args.input)
        .with_context(|| format!("Failed to parse scene {}", args.input.display()))?;
    let scene = Scene::from_description(&description)
        .with_context(|| format!("Failed to build scene {}", args.input.display()))?;
    let world = RenderWorld::new(&scene, &config);

    let mut buffer = render(&world);

    if let Some((x, y)) = args.debug_pixel() {
        ensure!(
            x < buffer.width && y < buffer.height,
            "Debug pixel ({}, {}) is outside the {}x{} image",
            x,
            y,
            buffer.width,
            buffer.height
        );
        println!("debug pixel: -x {} -y {}", x, y);

        let restore = log::max_level();
        log::set_max_level(LevelFilter::Trace);
        let color = world.render_pixel(x, y);
        log::set_max_level(restore);
        info!("debug pixel color: {:?}", color);

        buffer.set(x, y, Vec3::Y);
    }

    let image = to_rgb_image(&buffer);
    save_png(&image, &args.output)?;

    if let Some(solution) = &args.solution {
        let reference = load_reference(solution)?;
        let comparison = compare_images(&image, &reference)?;

        let statistic = format_statistic(&comparison);
        match &args.stats {
            Some(path) => fs::write(path, format!("{}\n", statistic))
                .with_context(|| format!("Failed to write statistics to {}", path.display()))?,
            None => println!("{}", statistic),
        }

        let diff_path = args.output.with_file_name("diff.png");
        save_png(&comparison.diff, &diff_path)?;
    }

    Ok(())
}

/// Render settings from the optional TOML file, then command line flags.
fn load_config(args: &Args) -> Result<RenderConfig> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => RenderConfig::default(),
    };

    let config = args.apply_overrides(config);
    config.validate().context("Invalid render configuration")?;
    info!("Render config: {:?}", config);
    Ok(config)
}

fn read_config(path: &Path) -> Result<RenderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
}
