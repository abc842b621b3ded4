use eframe::egui::{Align2, Color32, FontId, Rect, Sense, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::chart::{ChartKind, ChartSpec, Series};
use crate::color::{ColorMap, diverging, generate_palette};
use crate::data::aggregate::{CorrelationMatrix, Histogram, ScatterPoint, TreemapNode};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart dispatch
// ---------------------------------------------------------------------------

/// Render one chart spec.
pub fn chart(ui: &mut Ui, spec: &ChartSpec, colors: Option<&ColorMap>) {
    ui.strong(&spec.title);
    if spec.is_empty() {
        ui.label("No repositories match the current filters.");
        return;
    }

    match &spec.kind {
        ChartKind::Bar { bars } => bar_chart(ui, spec, bars, colors),
        ChartKind::GroupedBar { categories, series } => grouped_bar_chart(ui, spec, categories, series),
        ChartKind::Scatter { points, log_x, log_y } => scatter_plot(ui, spec, points, *log_x, *log_y),
        ChartKind::Histogram(h) => histogram_plot(ui, spec, h),
        ChartKind::Heatmap(m) => heatmap(ui, m),
        ChartKind::Treemap(root) => treemap(ui, root, colors),
    }
}

fn base_plot(spec: &ChartSpec) -> Plot {
    Plot::new(spec.title.clone())
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.x_label.clone())
        .y_axis_label(spec.y_label.clone())
        .allow_drag(true)
        .allow_zoom(true)
        .allow_scroll(false)
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// One bar per category; each category is its own series so the legend
/// doubles as the axis labelling.
fn bar_chart(ui: &mut Ui, spec: &ChartSpec, bars: &[(String, f64)], colors: Option<&ColorMap>) {
    let fallback = generate_palette(bars.len());
    base_plot(spec).show(ui, |plot_ui| {
        for (i, (label, value)) in bars.iter().enumerate() {
            let color = colors.map_or(fallback[i], |cm| cm.color_for(label));
            let bar = Bar::new(i as f64, *value).name(label).width(0.7);
            plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
        }
    });
}

fn grouped_bar_chart(ui: &mut Ui, spec: &ChartSpec, categories: &[String], series: &[Series]) {
    let palette = generate_palette(series.len());
    let group_width = 0.8;
    let bar_width = group_width / series.len().max(1) as f64;

    base_plot(spec).show(ui, |plot_ui| {
        for (k, s) in series.iter().enumerate() {
            let offset = -group_width / 2.0 + bar_width * (k as f64 + 0.5);
            let bars: Vec<Bar> = s
                .values
                .iter()
                .zip(categories)
                .enumerate()
                .map(|(i, (&v, name))| Bar::new(i as f64 + offset, v).name(name).width(bar_width))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).name(&s.name).color(palette[k]));
        }
    });
}

// ---------------------------------------------------------------------------
// Scatter / histogram
// ---------------------------------------------------------------------------

/// Log axes are drawn by plotting `log10`; points with a zero coordinate have
/// no place on a log axis and are left out.
fn scatter_plot(ui: &mut Ui, spec: &ChartSpec, points: &[ScatterPoint], log_x: bool, log_y: bool) {
    let axis = |v: u64, log: bool| -> Option<f64> {
        let v = v as f64;
        if !log {
            Some(v)
        } else if v > 0.0 {
            Some(v.log10())
        } else {
            None
        }
    };
    let coords: PlotPoints = points
        .iter()
        .filter_map(|p| Some([axis(p.x, log_x)?, axis(p.y, log_y)?]))
        .collect();

    let label = |name: &str, log: bool| if log { format!("log10({name})") } else { name.to_string() };
    base_plot(spec)
        .x_axis_label(label(&spec.x_label, log_x))
        .y_axis_label(label(&spec.y_label, log_y))
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(coords).radius(2.5).color(Color32::LIGHT_BLUE).name("repositories"));
        });
}

fn histogram_plot(ui: &mut Ui, spec: &ChartSpec, h: &Histogram) {
    let bars: Vec<Bar> = h
        .bins
        .iter()
        .map(|b| Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start))
        .collect();
    let density: PlotPoints = h.density.iter().copied().collect();

    base_plot(spec).show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name("count").color(Color32::LIGHT_BLUE));
        if !h.density.is_empty() {
            plot_ui.line(Line::new(density).name("density").color(Color32::DARK_BLUE).width(1.5));
        }
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn heatmap(ui: &mut Ui, m: &CorrelationMatrix) {
    let label_width = 110.0;
    let cell = Vec2::new(90.0, 30.0);
    let n = m.fields.len();
    let size = Vec2::new(label_width + cell.x * n as f32, cell.y * (n + 1) as f32);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    for (j, field) in m.fields.iter().enumerate() {
        let center = origin + Vec2::new(label_width + cell.x * (j as f32 + 0.5), cell.y * 0.5);
        painter.text(center, Align2::CENTER_CENTER, field.column(), font.clone(), text_color);
    }

    for (i, row_field) in m.fields.iter().enumerate() {
        let top = cell.y * (i + 1) as f32;
        painter.text(
            origin + Vec2::new(label_width - 6.0, top + cell.y * 0.5),
            Align2::RIGHT_CENTER,
            row_field.column(),
            font.clone(),
            text_color,
        );
        for (j, &col_field) in m.fields.iter().enumerate() {
            let value = m.get(*row_field, col_field).unwrap_or(f64::NAN);
            let min = origin + Vec2::new(label_width + cell.x * j as f32, top);
            let rect = Rect::from_min_size(min, cell).shrink(1.0);
            painter.rect_filled(rect, 0.0_f32, diverging(value));
            let text = if value.is_nan() { "NaN".to_string() } else { format!("{value:.2}") };
            painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), Color32::BLACK);
        }
    }
}

// ---------------------------------------------------------------------------
// Treemap
// ---------------------------------------------------------------------------

fn treemap(ui: &mut Ui, root: &TreemapNode, colors: Option<&ColorMap>) {
    let size = Vec2::new(ui.available_width().max(200.0), PLOT_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());

    let weights: Vec<u64> = root.children.iter().map(|c| c.weight).collect();
    let fallback = generate_palette(root.children.len());
    let font = FontId::proportional(12.0);

    for (i, (node, rect)) in root.children.iter().zip(layout(response.rect, &weights)).enumerate() {
        if rect.width() < 1.0 || rect.height() < 1.0 {
            continue;
        }
        let color = colors.map_or(fallback[i], |cm| cm.color_for(&node.label));
        painter.rect_filled(rect.shrink(1.0), 0.0_f32, color);
        if rect.width() > 40.0 && rect.height() > 28.0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("{}\n{}", node.label, node.weight),
                font.clone(),
                Color32::BLACK,
            );
        }
    }

    if let Some(pos) = response.hover_pos() {
        if let Some(node) = root
            .children
            .iter()
            .zip(layout(response.rect, &weights))
            .find_map(|(node, rect)| rect.contains(pos).then_some(node))
        {
            let share = node.weight as f64 / root.weight.max(1) as f64 * 100.0;
            response.on_hover_text(format!("{}: {} ({share:.1}%)", node.label, node.weight));
        }
    }
}

/// Strip layout: each weight (largest first) takes a slice of the remaining
/// area along its longer side, proportional to its share of what is left.
pub fn layout(area: Rect, weights: &[u64]) -> Vec<Rect> {
    let mut remaining_weight: f64 = weights.iter().map(|&w| w as f64).sum();
    let mut rest = area;
    let mut rects = Vec::with_capacity(weights.len());

    for &w in weights {
        let w = w as f64;
        if remaining_weight <= 0.0 {
            rects.push(Rect::from_min_size(rest.min, Vec2::ZERO));
            continue;
        }
        let share = (w / remaining_weight).clamp(0.0, 1.0) as f32;
        if rest.width() >= rest.height() {
            let width = rest.width() * share;
            rects.push(Rect::from_min_size(rest.min, Vec2::new(width, rest.height())));
            rest.min.x += width;
        } else {
            let height = rest.height() * share;
            rects.push(Rect::from_min_size(rest.min, Vec2::new(rest.width(), height)));
            rest.min.y += height;
        }
        remaining_weight = (remaining_weight - w).max(0.0);
    }

    rects
}

#[cfg(test)]
mod tests {
    use eframe::egui::Pos2;

    use super::*;

    #[test]
    fn layout_fills_the_area_proportionally() {
        let area = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 200.0));
        let rects = layout(area, &[50, 30, 20]);
        assert_eq!(rects.len(), 3);

        let total: f32 = rects.iter().map(|r| r.area()).sum();
        assert!((total - area.area()).abs() < 1.0);
        assert!((rects[0].area() / area.area() - 0.5).abs() < 1e-3);
        assert!((rects[2].area() / area.area() - 0.2).abs() < 1e-3);
        for r in &rects {
            assert!(area.expand(0.01).contains_rect(*r));
        }
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let area = Rect::from_min_size(Pos2::ZERO, Vec2::new(300.0, 100.0));
        let rects = layout(area, &[u64::MAX, u64::MAX, 0]);
        assert_eq!(rects.len(), 3);
        assert!((rects[0].area() / area.area() - 0.5).abs() < 1e-3);
        assert!((rects[1].area() / area.area() - 0.5).abs() < 1e-3);
        assert_eq!(rects[2].area(), 0.0);
    }

    #[test]
    fn zero_weights_get_empty_rects() {
        let area = Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 100.0));
        let rects = layout(area, &[0, 0]);
        assert!(rects.iter().all(|r| r.area() == 0.0));
    }
}
