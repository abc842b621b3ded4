use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use strum::IntoEnumIterator;

use crate::router::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    let mut page = state.page;
    for p in Page::iter() {
        ui.radio_value(&mut page, p, p.label());
    }
    state.set_page(page);
    ui.separator();

    ui.heading("Filters");

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut criteria = state.criteria.clone();
    let mut toggled = Vec::new();

    ui.add(egui::Slider::new(&mut criteria.min_stars, 0..=dataset.max_stars).text("Minimum Stars"));

    // ---- Language multi-select (collapsible) ----
    let header_text = format!(
        "Select Languages  ({}/{})",
        criteria.languages.len(),
        dataset.languages.len()
    );
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("languages")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                criteria.languages.clear();
            }
            ScrollArea::vertical()
                .max_height(240.0)
                .show(ui, |ui: &mut Ui| {
                    for lang in &dataset.languages {
                        let mut checked = criteria.languages.contains(lang);
                        let mut text = RichText::new(lang);
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(lang));
                        }
                        if ui.checkbox(&mut checked, text).changed() {
                            toggled.push(lang.clone());
                        }
                    }
                });
        });
    ui.separator();

    // ---- Size bounds (contributors) ----
    ui.heading("Advanced Filters");
    egui::Grid::new("size_bounds").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Minimum Repository Size");
        ui.add(egui::DragValue::new(&mut criteria.min_contributors));
        ui.end_row();
        ui.label("Maximum Repository Size");
        ui.add(egui::DragValue::new(&mut criteria.max_contributors));
        ui.end_row();
    });

    // Recompute visible rows after any widget changes.
    state.set_criteria(criteria);
    for lang in toggled {
        state.toggle_language(&lang);
    }

    ui.separator();
    ui.label(format!("Showing {} repositories", state.visible_indices.len()));

    if state.page == Page::RepositoryAnalysis {
        ui.separator();
        comparison_picker(ui, state);
    }
}

/// Checkbox list of the visible repositories for the comparison chart.
fn comparison_picker(ui: &mut Ui, state: &mut AppState) {
    let names: Vec<String> = state.visible_names().into_iter().map(str::to_string).collect();
    let mut toggled = Vec::new();

    let header_text = format!("Repositories to compare  ({})", state.compare.len());
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("compare")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let row_height = ui.spacing().interact_size.y;
            ScrollArea::vertical()
                .max_height(240.0)
                .show_rows(ui, row_height, names.len(), |ui: &mut Ui, rows| {
                    for name in &names[rows] {
                        let mut checked = state.compare.contains(name);
                        if ui.checkbox(&mut checked, name.as_str()).changed() {
                            toggled.push(name.clone());
                        }
                    }
                });
        });

    for name in toggled {
        state.toggle_compare(&name);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, timeout: Duration) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, timeout);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload(Instant::now());
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} repositories from {}",
                ds.len(),
                state.cache.fetcher().source()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, timeout: Duration) {
    let file = rfd::FileDialog::new()
        .set_title("Open repository dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.open_file(&path, timeout) {
            log::error!("Failed to open {}: {e:#}", path.display());
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
