mod demo;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_core::color::DEFAULT_GAMMA;
use lumen_core::{kelvin_to_rgb, regrade, rgb_to_kelvin};
use lumen_renderer::{RenderConfig, RenderMode, RenderSession};

/// Lumen offline path tracer.
#[derive(Parser, Debug)]
#[command(name = "lumen", about = "Lumen offline path tracer", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the built-in demo scene.
    Render {
        /// JSON render config (seed, threads, outputs, monitor).
        config: Option<PathBuf>,

        /// Paths per pixel.
        #[arg(long, default_value = "64")]
        samples: u32,

        /// Quick headlight preview instead of path tracing.
        #[arg(long)]
        raycast: bool,
    },

    /// Re-encode a raw image as PNG without re-rendering.
    Regrade {
        input: PathBuf,
        output: PathBuf,
        #[arg(default_value_t = DEFAULT_GAMMA)]
        gamma: f32,
        #[arg(default_value = "1.0")]
        exposure: f32,
    },

    /// Print the linear RGB of a black body and its round-tripped temperature.
    Kelvin { kelvin: f32 },
}

fn render(config: Option<PathBuf>, samples: u32, raycast: bool) -> Result<()> {
    let mut config = match &config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to load render config {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if config.png_path.is_none() && config.raw_path.is_none() {
        config.png_path = Some(PathBuf::from("lumen.png"));
    }

    let mode = if raycast {
        RenderMode::Raycasting
    } else {
        RenderMode::Pathtracing
    };
    let scene = demo::demo_scene().context("Failed to build demo scene")?;
    let camera = demo::demo_camera(samples, mode).context("Failed to set up camera")?;

    let session = RenderSession::new(config);
    session.render(&scene, &camera).context("Render failed")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match Args::parse().command {
        Command::Render {
            config,
            samples,
            raycast,
        } => render(config, samples, raycast)?,
        Command::Regrade {
            input,
            output,
            gamma,
            exposure,
        } => {
            regrade(&input, &output, gamma, exposure)
                .with_context(|| format!("Failed to regrade {}", input.display()))?;
        }
        Command::Kelvin { kelvin } => {
            let rgb = kelvin_to_rgb(kelvin);
            println!("{kelvin} K -> rgb({:.4}, {:.4}, {:.4})", rgb.x, rgb.y, rgb.z);
            match rgb_to_kelvin(rgb) {
                Some(estimate) => println!("round trip: {estimate:.1} K"),
                None => println!("round trip: no temperature"),
            }
        }
    }

    Ok(())
}
