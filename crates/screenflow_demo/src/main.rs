// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen Flow demo - headless scenario runner
//!
//! Loads a controller config and a sequence library (RON), registers a small
//! game menu made of logging views and drives it at a fixed frame rate:
//! - Blink-fade transitions between primary screens
//! - Animated section panels with a dimming raycast filter
//! - Back/cancel and outside-touch handling
//!
//! ## Usage
//!
//! `screenflow_demo [config.ron] [sequences.ron] [--strict]`
//!
//! Without arguments the bundled assets are used. With `--strict` any
//! captured warning fails the run.

mod log_bridge;
mod scenario;
mod views;

use log_bridge::WarningBridge;
use scenario::{DemoError, Scenario};
use screenflow_animation::SequenceLibrary;
use screenflow_navigation::ScreenFlowConfig;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = include_str!("../assets/config.ron");
const DEFAULT_SEQUENCES: &str = include_str!("../assets/sequences.ron");

fn load(config: Option<&str>, sequences: Option<&str>) -> Result<Scenario, DemoError> {
    let config = match config {
        Some(path) => ScreenFlowConfig::load(Path::new(path))?,
        None => ScreenFlowConfig::from_ron(DEFAULT_CONFIG)?,
    };
    let library = match sequences {
        Some(path) => SequenceLibrary::load(Path::new(path))?,
        None => SequenceLibrary::from_ron(DEFAULT_SEQUENCES)?,
    };
    Ok(Scenario::new(config, library))
}

fn main() {
    let (bridge_layer, warnings_rx) = WarningBridge::new();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("screenflow_demo=info,screenflow_navigation=info,screenflow_animation=info")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    tracing::info!("Starting Screen Flow demo v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let strict = args.iter().any(|arg| arg == "--strict");
    let mut paths = args.iter().filter(|arg| !arg.starts_with("--")).map(String::as_str);

    let report = match load(paths.next(), paths.next()).and_then(Scenario::run) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scenario failed: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Finished after {} frames on '{}' ({} state changes, {} activations, selection {:?})",
        report.frames,
        report.final_primary.as_deref().unwrap_or("<none>"),
        report.state_changes.len(),
        report.activations.len(),
        report.selection
    );
    tracing::info!("Open screens: {}", report.open_screens.join(", "));

    let warnings: Vec<_> = warnings_rx.try_iter().collect();
    for warning in &warnings {
        tracing::info!("Captured {} from {}: {}", warning.level, warning.target, warning.message);
    }
    if strict && !warnings.is_empty() {
        tracing::error!("{} warnings captured in strict mode", warnings.len());
        std::process::exit(1);
    }
}
