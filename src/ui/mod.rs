/// egui rendering of the dashboard: side panel, top bar, page sections and charts.
pub mod page;
pub mod panels;
pub mod plot;
