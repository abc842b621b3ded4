mod app;
mod chart;
mod color;
mod config;
mod data;
mod headless;
mod pipeline;
mod router;
mod state;
mod ui;

use anyhow::Result;
use app::DashboardApp;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    if config.headless {
        return headless::run(&config);
    }

    let app = DashboardApp::new(&config)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "GitHub Repository Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
