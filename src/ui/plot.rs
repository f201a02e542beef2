use eframe::egui::{Align2, Color32, RichText, Ui};
use egui_plot::{
    Legend, Line, LineStyle, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points, Text,
};

use crate::color::{TraceColor, visible_on};
use crate::figures::{Figure, Overview, PeakMarker, Series};
use crate::state::{AppState, ViewContent};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render whatever the current view resolved to.
pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    let reset = state.reset_bounds;
    match &state.content {
        ViewContent::Hint(text) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(*text);
            });
        }
        ViewContent::Failed(msg) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(
                    RichText::new(format!("Cannot draw this figure: {msg}")).color(Color32::RED),
                );
            });
        }
        ViewContent::Figure(fig) => {
            let height = ui.available_height() - title_height(fig);
            figure_plot(ui, "comparison_plot", fig, height, reset);
        }
        ViewContent::Overview(overview) => overview_grid(ui, overview, reset),
    }
    state.reset_bounds = false;
}

fn title_height(fig: &Figure) -> f32 {
    24.0 * fig.title.lines().count() as f32
}

/// 2×2 grid of solver-only panels.
fn overview_grid(ui: &mut Ui, overview: &Overview, reset: bool) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&overview.title);
    });
    let row_height = ui.available_height() / 2.0;
    let [a, b, c, d] = &overview.panels;
    for (row, pair) in [[a, b], [c, d]].into_iter().enumerate() {
        ui.columns(2, |cols| {
            for (col, (cell, fig)) in cols.iter_mut().zip(pair).enumerate() {
                let height = row_height - title_height(fig) - 8.0;
                figure_plot(cell, &format!("overview_{row}_{col}"), fig, height, reset);
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Single figure
// ---------------------------------------------------------------------------

/// Draw one figure: title above, curves, peak markers and labels.
///
/// With `reset` the plot snaps to the figure's initial window; otherwise it
/// keeps whatever the user panned or zoomed to.
pub fn figure_plot(ui: &mut Ui, id: &str, fig: &Figure, height: f32, reset: bool) {
    let dark = ui.visuals().dark_mode;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong(&fig.title);
    });

    let bounds = fig.view_bounds();
    let mut plot = Plot::new(id)
        .height(height.max(80.0))
        .legend(Legend::default())
        .x_axis_label(fig.x_label.as_str())
        .y_axis_label(fig.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    // Auto-fit on double-click always covers the initial window.
    if let Some(([x_lo, y_lo], [x_hi, y_hi])) = bounds {
        plot = plot.include_x(x_lo).include_x(x_hi).include_y(y_lo).include_y(y_hi);
    }

    plot.show(ui, |plot_ui| {
        if let Some((min, max)) = bounds.filter(|_| reset) {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
        }
        for series in &fig.series {
            let color = visible_on(series.color, dark);
            plot_ui.line(series_line(series, color));
            if series.show_points {
                plot_ui.points(
                    Points::new(series_points(series))
                        .name(&series.label)
                        .shape(MarkerShape::Square)
                        .radius(1.5)
                        .color(color),
                );
            }
        }
        for marker in &fig.markers {
            plot_ui.points(
                Points::new(vec![[marker.x, marker.y]])
                    .shape(MarkerShape::Circle)
                    .radius(marker.radius)
                    .filled(true)
                    .color(marker_color(marker.color, dark)),
            );
            plot_ui.text(marker_text(marker, dark));
        }
    });
}

fn series_points(series: &Series) -> PlotPoints {
    series
        .x
        .iter()
        .zip(series.y.iter())
        .map(|(&xi, &yi)| [xi, yi])
        .collect()
}

fn series_line(series: &Series, color: Color32) -> Line {
    let line = Line::new(series_points(series))
        .name(&series.label)
        .color(color)
        .width(series.width * 1.25);
    if series.dashed {
        line.style(LineStyle::dashed_loose())
    } else {
        line
    }
}

fn marker_color(color: TraceColor, dark: bool) -> Color32 {
    match color {
        TraceColor::Black | TraceColor::Grey => visible_on(color, dark),
        other => other.shaded(0.15),
    }
}

/// Peak label, anchored on the side its offset points to.
fn marker_text(marker: &PeakMarker, dark: bool) -> Text {
    let anchor = if marker.label_offset[0] < 0.0 {
        Align2::RIGHT_BOTTOM
    } else {
        Align2::LEFT_BOTTOM
    };
    let label = RichText::new(format!("  {}  ", marker.label))
        .color(visible_on(marker.label_color, dark));
    Text::new(PlotPoint::new(marker.x, marker.y), label).anchor(anchor)
}
