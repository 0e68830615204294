//! Application entry point for the Pulse Portal viewer.
//!
//! This binary parses the command line, loads the optional config file,
//! sets up eframe/egui and delegates everything else to [`Portal`] from
//! the `viewer` module.

mod viewer;

use std::path::PathBuf;

use clap::Parser;
use pulse_core::config::PortalConfig;
use pulse_core::error::ConfigError;
use viewer::Portal;

/// Neural network background and memory stream, in a native window.
#[derive(Parser, Debug)]
#[command(name = "pulse-view", version, about)]
struct Args {
    /// YAML config file; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON batch to stream: an http(s) URL or a file path.
    #[arg(long)]
    data_source: Option<String>,

    /// Milliseconds per revealed character.
    #[arg(long)]
    speed: Option<u64>,

    /// Milliseconds between memory items.
    #[arg(long)]
    interval: Option<u64>,

    /// Number of network nodes.
    #[arg(long)]
    nodes: Option<usize>,
}

impl Args {
    /// Loads the config file, if any, then applies command-line overrides.
    fn into_config(self) -> Result<PortalConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => PortalConfig::load(path)?,
            None => PortalConfig::default(),
        };
        if let Some(source) = self.data_source {
            cfg.feed.data_source = source;
        }
        if let Some(speed) = self.speed {
            cfg.feed.speed = speed;
        }
        if let Some(interval) = self.interval {
            cfg.feed.interval = interval;
        }
        if let Some(nodes) = self.nodes {
            cfg.network.node_count = nodes;
        }
        Ok(cfg)
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the config file cannot be loaded, or eframe fails to create
///   the native window or event loop.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cfg = Args::parse().into_config()?;
    log::info!(
        "starting with {} nodes, streaming from {}",
        cfg.network.node_count,
        cfg.feed.data_source
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pulse Portal",
        options,
        Box::new(move |_cc| Ok(Box::new(Portal::new(cfg)))),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "pulse-view",
            "--data-source",
            "https://example.org/m.json",
            "--speed",
            "20",
            "--nodes",
            "60",
        ])
        .unwrap();

        let cfg = args.into_config().unwrap();
        assert_eq!(cfg.feed.data_source, "https://example.org/m.json");
        assert_eq!(cfg.feed.speed, 20);
        assert_eq!(cfg.feed.interval, 5000);
        assert_eq!(cfg.network.node_count, 60);
    }

    #[test]
    fn flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("pulse-view-{}.yaml", std::process::id()));
        std::fs::write(&path, "feed:\n  interval: 1000\n  speed: 10\n").unwrap();

        let args = Args::try_parse_from([
            "pulse-view",
            "--config",
            path.to_str().unwrap(),
            "--speed",
            "30",
        ])
        .unwrap();
        let cfg = args.into_config();
        std::fs::remove_file(&path).unwrap();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.feed.interval, 1000);
        assert_eq!(cfg.feed.speed, 30);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args =
            Args::try_parse_from(["pulse-view", "--config", "/no/such/portal.yaml"]).unwrap();
        assert!(matches!(args.into_config(), Err(ConfigError::Io { .. })));
    }
}
