use eframe::egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::router::SectionBody;
use crate::state::AppState;
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Central panel – the selected page
// ---------------------------------------------------------------------------

/// Render the sections of the current page.
pub fn page_view(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.load_failed {
                ui.heading("Could not load the dataset  (File → Reload)");
            } else {
                ui.heading("Loading dataset…");
            }
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(&output.title).size(24.0).strong());

            for (i, section) in output.sections.iter().enumerate() {
                if let Some(heading) = &section.heading {
                    ui.add_space(12.0);
                    ui.heading(heading);
                }
                ui.push_id(i, |ui: &mut Ui| match &section.body {
                    SectionBody::Text { text } => {
                        ui.label(text);
                    }
                    SectionBody::Stats { stats } => {
                        for (label, value) in stats {
                            ui.label(format!("{label}: {value}"));
                        }
                    }
                    SectionBody::Table { columns, rows } => table(ui, columns, rows),
                    SectionBody::Chart(spec) => plot::chart(ui, spec, state.color_map.as_ref()),
                });
            }
        });
}

fn table(ui: &mut Ui, columns: &[String], rows: &[Vec<String>]) {
    let mut builder = TableBuilder::new(ui).striped(true).vscroll(false);
    for i in 0..columns.len() {
        builder = if i == 0 {
            builder.column(Column::auto().at_least(240.0))
        } else {
            builder.column(Column::auto().at_least(80.0))
        };
    }

    builder
        .header(20.0, |mut header| {
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut cells| {
                    for cell in row {
                        cells.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
