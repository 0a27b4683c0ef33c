//! handvox: sculpt voxels in the terminal with a simulated hand
//!
//! Usage:
//!   handvox                          # defaults
//!   handvox --config handvox.toml    # load settings from TOML
//!   handvox --log-file handvox.log   # write tracing output to a file

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use handvox_app::RunOptions;
use handvox_core::HandvoxConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Sculpt voxel structures with hand gestures")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here; the terminal is taken over by the view
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    fps: u32,

    /// Vertical field of view in degrees
    #[arg(long)]
    fov: Option<f32>,

    /// Frames a gesture must persist before it takes effect
    #[arg(long)]
    debounce: Option<u32>,

    /// Camera yaw per frame outside open palm, in degrees
    #[arg(long)]
    auto_rotate: Option<f32>,

    /// Seed for the initial pattern's colors
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames (0 = until quit)
    #[arg(long, default_value_t = 0)]
    max_frames: u64,
}

impl Args {
    fn apply_overrides(&self, config: &mut HandvoxConfig) {
        if let Some(fov) = self.fov {
            config.camera.fov_degrees = fov;
        }
        if let Some(frames) = self.debounce {
            config.gesture.debounce_frames = frames;
        }
        if let Some(degrees) = self.auto_rotate {
            config.controller.auto_rotate_degrees = degrees;
        }
        if let Some(seed) = self.seed {
            config.world.rng_seed = seed;
        }
    }
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("handvox=info,handvox_app=info,handvox_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => HandvoxConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => HandvoxConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let options = RunOptions {
        fps: args.fps,
        max_frames: args.max_frames,
    };
    handvox_app::run(&config, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let args = Args::parse_from(["handvox", "--fov", "75", "--debounce", "5", "--seed", "9"]);
        let mut config = HandvoxConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.gesture.debounce_frames, 5);
        assert_eq!(config.world.rng_seed, 9);
        assert_eq!(config.controller.auto_rotate_degrees, 0.5);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let args = Args::parse_from(["handvox", "--debounce", "0"]);
        let mut config = HandvoxConfig::default();
        args.apply_overrides(&mut config);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fps_range() {
        assert!(Args::try_parse_from(["handvox", "--fps", "0"]).is_err());
        assert_eq!(Args::parse_from(["handvox"]).fps, 30);
    }
}
