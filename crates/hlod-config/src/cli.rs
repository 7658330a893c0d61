//! Command-line argument parsing for the HLOD tools.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// HLOD command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "hlod", about = "Hierarchical LOD visibility switching")]
pub struct CliArgs {
    /// Relative height above which the high representation is shown.
    #[arg(long)]
    pub lod_distance: Option<f32>,

    /// Relative height at or below which nodes are culled.
    #[arg(long)]
    pub cull_distance: Option<f32>,

    /// Multiplier on the viewer scale factor.
    #[arg(long)]
    pub lod_bias: Option<f32>,

    /// Registry key of the representation controller implementation.
    #[arg(long)]
    pub streaming_type: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of nodes per grid edge in the demo scene.
    #[arg(long, default_value_t = 8)]
    pub nodes: u32,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    pub frames: u32,

    /// Frames a simulated load takes to complete.
    #[arg(long, default_value_t = 3)]
    pub load_latency: u32,
}

impl Default for CliArgs {
    /// Same values as parsing an empty command line.
    fn default() -> Self {
        Self {
            lod_distance: None,
            cull_distance: None,
            lod_bias: None,
            streaming_type: None,
            log_level: None,
            config: None,
            nodes: 8,
            frames: 600,
            load_latency: 3,
        }
    }
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(d) = args.lod_distance {
            self.lod.lod_distance = d;
        }
        if let Some(d) = args.cull_distance {
            self.lod.cull_distance = d;
        }
        if let Some(bias) = args.lod_bias {
            self.lod.lod_bias = bias;
        }
        if let Some(ref key) = args.streaming_type {
            self.streaming.streaming_type = key.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
