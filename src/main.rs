// main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inkzone::app::InkZoneApp;
use inkzone::canned::CannedService;
use inkzone::config::SelectorConfig;
use inkzone::ZoneCatalog;

#[derive(Parser, Debug)]
#[command(name = "inkzone", about = "Tattoo placement studio with a 3D body-zone picker")]
struct CliArgs {
    /// Zone catalog JSON to use instead of the built-in figure
    #[arg(long, value_name = "PATH")]
    zones: Option<PathBuf>,
    /// Selector config overriding the user config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Pixels of travel before a press turns into a rotate-drag
    #[arg(long, value_name = "PX")]
    click_threshold: Option<f32>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_catalog(path: Option<&PathBuf>) -> Result<ZoneCatalog, inkzone::ZoneError> {
    if let Some(p) = path {
        match ZoneCatalog::from_file(p) {
            Ok(c) => return Ok(c),
            Err(e) => warn!("{e}; falling back to the built-in figure"),
        }
    }
    ZoneCatalog::builtin()
}

fn main() -> eframe::Result {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut config = SelectorConfig::resolve(args.config.as_deref());
    if let Some(px) = args.click_threshold { config.click_threshold_px = px; }
    let config = config.sanitized();

    let catalog = match load_catalog(args.zones.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e}");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };
    info!(zones = catalog.len(), "starting InkZone Studio");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        centered: true,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "InkZone Studio",
        options,
        Box::new(move |cc| Ok(Box::new(InkZoneApp::new(cc, catalog, config, Arc::new(CannedService::new()))))),
    )
}
