use std::time::{Duration, Instant};

use anyhow::Result;
use eframe::egui;

use crate::config::Config;
use crate::data::cache::DatasetCache;
use crate::data::loader::SourceLoader;
use crate::state::AppState;
use crate::ui::{page, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    /// HTTP timeout reused when the user opens another source.
    pub timeout: Duration,
}

impl DashboardApp {
    pub fn new(config: &Config) -> Result<Self> {
        let loader = SourceLoader::new(config.dataset_source(), config.timeout())?;
        Ok(Self {
            state: AppState::new(DatasetCache::new(loader, config.ttl())),
            timeout: config.timeout(),
        })
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.state.refresh(now);
        if let Some(left) = self.state.time_to_expiry(now) {
            // wake up to reload even without user input
            ctx.request_repaint_after(left);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, self.timeout);
        });

        // ---- Left side panel: navigation and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the selected page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            page::page_view(ui, &self.state);
        });
    }
}
