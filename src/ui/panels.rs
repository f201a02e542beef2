use eframe::egui::{self, Color32, Grid, RichText, ScrollArea, Ui};

use crate::data::loader::{REFERENCE_STEM, SOLVER_STEM, SUPPORTED_EXTENSIONS};
use crate::data::selector::ComparisonVariant;
use crate::figures::FigureKind;
use crate::state::{AppState, LoadedResults, View};

// ---------------------------------------------------------------------------
// Left side panel – loaded data
// ---------------------------------------------------------------------------

/// Render the left panel: what is loaded and which reference run applies.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            results_section(ui, "Solver", "solver_keys", state.solver.as_ref());
            ui.separator();
            results_section(ui, "Reference", "reference_keys", state.reference.as_ref());
            ui.separator();

            ui.strong("Beam offsets");
            match state.solver.as_ref().map(|s| s.results.beam_offsets()) {
                None => {
                    ui.label("–");
                }
                Some(Err(e)) => {
                    ui.label(RichText::new(e.to_string()).color(Color32::RED));
                }
                Some(Ok(offsets)) => {
                    Grid::new("offsets_grid").num_columns(3).show(ui, |ui: &mut Ui| {
                        ui.label("");
                        ui.label("x [mm]");
                        ui.label("y [mm]");
                        ui.end_row();
                        ui.label("source");
                        ui.label(format!("{}", offsets.source_x * 1e3));
                        ui.label(format!("{}", offsets.source_y * 1e3));
                        ui.end_row();
                        ui.label("test");
                        ui.label(format!("{}", offsets.test_x * 1e3));
                        ui.label(format!("{}", offsets.test_y * 1e3));
                        ui.end_row();
                    });
                    let variant = ComparisonVariant::select(&offsets);
                    ui.label(format!("Reference run: {variant}"));
                }
            }
        });
}

fn results_section(ui: &mut Ui, title: &str, id: &str, loaded: Option<&LoadedResults>) {
    ui.strong(title);
    let Some(loaded) = loaded else {
        ui.label("Not loaded.");
        return;
    };
    ui.label(loaded.path.display().to_string());
    egui::CollapsingHeader::new(format!("{} quantities", loaded.results.len()))
        .id_salt(id)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for (key, value) in loaded.results.iter() {
                ui.label(format!("{key}: {value}"));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open solver results…").clicked() {
                open_file_dialog(state, Target::Solver);
                ui.close_menu();
            }
            if ui.button("Open reference results…").clicked() {
                open_file_dialog(state, Target::Reference);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.view == View::Overview, "Overview")
            .clicked()
        {
            state.select_view(View::Overview);
        }
        for kind in FigureKind::ALL {
            let view = View::Comparison(kind);
            if ui
                .selectable_label(state.view == view, kind.tab_label())
                .clicked()
            {
                state.select_view(view);
            }
        }

        ui.separator();

        let mut compare = state.options.compare_to_reference;
        if ui.checkbox(&mut compare, "Compare to reference").changed() {
            state.set_compare_to_reference(compare);
        }
        let mut normalize = state.options.normalize_scale;
        if ui.checkbox(&mut normalize, "Normalize scale").changed() {
            state.set_normalize_scale(normalize);
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

#[derive(Clone, Copy)]
enum Target {
    Solver,
    Reference,
}

fn open_file_dialog(state: &mut AppState, target: Target) {
    let (title, stem) = match target {
        Target::Solver => ("Open solver results", SOLVER_STEM),
        Target::Reference => ("Open reference results", REFERENCE_STEM),
    };
    let file = rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(stem)
        .add_filter("Supported files", &SUPPORTED_EXTENSIONS)
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match target {
            Target::Solver => state.load_solver(&path),
            Target::Reference => state.load_reference(&path),
        }
    }
}
