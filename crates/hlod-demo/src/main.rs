use std::f32::consts::FRAC_PI_3;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec3;
use hlod_config::{CliArgs, Config};
use hlod_lod::Bounds;
use hlod_scene::{
    ControllerRegistry, HlodManager, NodeSettings, RepresentationRoot, SharedNode, Viewer,
};
use tracing::{error, info};

mod streaming;

use streaming::{DelayedController, LoadClock};

/// Distance between neighbouring nodes in the demo grid.
const NODE_SPACING: f32 = 40.0;

/// Key under which the simulated streaming controller is registered.
const DELAYED_STREAMING: &str = "delayed";

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| ".hlod".into());

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    hlod_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    // Thresholds may come from the CLI, and load-time warnings predate the subscriber.
    config.warn_if_unordered();

    info!(
        lod_distance = config.lod.lod_distance,
        cull_distance = config.lod.cull_distance,
        lod_bias = config.lod.lod_bias,
        streaming = %config.streaming.streaming_type,
        "hlod demo starting"
    );

    let clock = LoadClock::default();
    let registry = build_registry(&clock, args.load_latency);

    let mut manager = HlodManager::new();
    let nodes = match build_grid(&mut manager, &registry, &config, args.nodes) {
        Ok(nodes) => nodes,
        Err(e) => {
            error!("failed to build scene: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(nodes = nodes.len(), "scene ready");

    fly_over(&mut manager, &clock, &config, &args);

    info!(pending_loads = clock.in_flight(), "shutting down");
    manager.shutdown();
    ExitCode::SUCCESS
}

/// Registry with the built-in controllers plus the simulated streaming one.
fn build_registry(clock: &LoadClock, default_latency: u32) -> ControllerRegistry {
    let mut registry = ControllerRegistry::with_defaults();
    let clock = clock.clone();
    registry.register(DELAYED_STREAMING, move |root, options| {
        let latency = options
            .get("latency_frames")
            .and_then(|v| v.parse().ok())
            .unwrap_or(u64::from(default_latency));
        DelayedController::new(root, clock.clone(), latency).into_handle()
    });
    registry
}

/// Lay out `edge * edge` nodes on the XZ plane, each with a high and a low root.
fn build_grid(
    manager: &mut HlodManager,
    registry: &ControllerRegistry,
    config: &Config,
    edge: u32,
) -> Result<Vec<SharedNode>, hlod_scene::SceneError> {
    let settings = NodeSettings::from_config(config);
    let half = (edge.saturating_sub(1)) as f32 * NODE_SPACING * 0.5;
    let mut nodes = Vec::with_capacity((edge * edge) as usize);

    for x in 0..edge {
        for z in 0..edge {
            let center = Vec3::new(
                x as f32 * NODE_SPACING - half,
                0.0,
                z as f32 * NODE_SPACING - half,
            );
            let node = manager.create_node(format!("cell_{x}_{z}"), settings.clone());
            {
                let mut n = node.borrow_mut();
                n.set_high_root(Some(RepresentationRoot::new("High")));
                n.set_low_root(Some(RepresentationRoot::new("Low")));
                n.attach_controllers(registry)?;

                // A building and its annex.
                let renderers = [
                    Bounds::new(center + Vec3::new(0.0, 6.0, 0.0), Vec3::new(12.0, 12.0, 8.0)),
                    Bounds::new(center + Vec3::new(7.0, 2.0, 0.0), Vec3::new(4.0, 4.0, 4.0)),
                ];
                n.calc_bounds(&renderers);
                n.awake();
            }
            manager.activate(&node);
            node.borrow_mut().install();
            nodes.push(node);
        }
    }
    Ok(nodes)
}

/// Fly the viewer in from far away, across the grid, and back out.
fn fly_over(manager: &mut HlodManager, clock: &LoadClock, config: &Config, args: &CliArgs) {
    let frames = args.frames.max(1);
    let far = 3000.0;
    let report_every = (frames / 10).max(1);

    for frame in 0..frames {
        let t = frame as f32 / frames as f32;
        // Descend toward the grid for the first half, climb away for the second.
        let height = far * (2.0 * t - 1.0).abs() + 5.0;
        let sweep = (t * std::f32::consts::TAU).sin() * NODE_SPACING * args.nodes as f32 * 0.5;
        let viewer = Viewer::perspective(Vec3::new(sweep, height, sweep * 0.5), FRAC_PI_3)
            .with_lod_bias(config.lod.lod_bias);

        clock.tick();
        manager.update(&viewer);

        if frame % report_every == 0 || frame + 1 == frames {
            let counts = manager.state_counts();
            info!(
                frame,
                height,
                high = counts.high,
                low = counts.low,
                cull = counts.cull,
                unbuilt = counts.unbuilt,
                loading = clock.in_flight(),
                "frame"
            );
        }
    }
}
