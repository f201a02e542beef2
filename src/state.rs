use std::path::{Path, PathBuf};

use crate::data::loader;
use crate::data::model::ResultSet;
use crate::figures::{self, Figure, FigureKind, Overview, PlotOptions};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which chart the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Solver-only 2×2 grid.
    Overview,
    Comparison(FigureKind),
}

/// What the central panel should draw for the current view.
#[derive(Debug, Clone)]
pub enum ViewContent {
    Overview(Box<Overview>),
    Figure(Box<Figure>),
    /// Nothing to draw yet; the text tells the operator what is missing.
    Hint(&'static str),
    Failed(String),
}

/// A loaded result file and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedResults {
    pub path: PathBuf,
    pub results: ResultSet,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Wake solver output (None until loaded).
    pub solver: Option<LoadedResults>,

    /// Reference-tool export (None until loaded).
    pub reference: Option<LoadedResults>,

    /// Overlay / normalization switches.
    pub options: PlotOptions,

    /// Chart currently selected.
    pub view: View,

    /// Content for `view` (cached, rebuilt by [`AppState::refresh`]).
    pub content: ViewContent,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set when `content` changed; the next drawn frame snaps the plots to
    /// their initial window and clears it.
    pub reset_bounds: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PlotOptions::default())
    }
}

impl AppState {
    pub fn new(options: PlotOptions) -> Self {
        let mut state = Self {
            solver: None,
            reference: None,
            options,
            view: View::Overview,
            content: ViewContent::Hint(""),
            status_message: None,
            reset_bounds: false,
        };
        state.refresh();
        state
    }

    /// Rebuild the cached content after data, options or view changed.
    pub fn refresh(&mut self) {
        self.content = self.build_content();
        self.reset_bounds = true;
        if let ViewContent::Failed(msg) = &self.content {
            log::error!("Cannot draw {:?}: {msg}", self.view);
        }
    }

    fn build_content(&self) -> ViewContent {
        let Some(solver) = &self.solver else {
            return ViewContent::Hint("Open solver results to begin  (File → Open solver results…)");
        };
        let result = match self.view {
            View::Overview => {
                figures::overview(&solver.results).map(|o| ViewContent::Overview(Box::new(o)))
            }
            View::Comparison(kind) => {
                let Some(reference) = &self.reference else {
                    return ViewContent::Hint(
                        "Open reference results to compare  (File → Open reference results…)",
                    );
                };
                figures::build(kind, &solver.results, &reference.results, self.options)
                    .map(|f| ViewContent::Figure(Box::new(f)))
            }
        };
        result.unwrap_or_else(|e| ViewContent::Failed(e.to_string()))
    }

    /// Ingest newly loaded solver results.
    pub fn set_solver(&mut self, path: PathBuf, results: ResultSet) {
        self.solver = Some(LoadedResults { path, results });
        self.status_message = None;
        self.refresh();
    }

    /// Ingest newly loaded reference results.
    pub fn set_reference(&mut self, path: PathBuf, results: ResultSet) {
        self.reference = Some(LoadedResults { path, results });
        self.status_message = None;
        if self.view == View::Overview {
            self.view = View::Comparison(FigureKind::LongitudinalWake);
        }
        self.refresh();
    }

    /// Load solver results from a file or run directory.
    pub fn load_solver(&mut self, path: &Path) {
        match loader::load_solver_output(path) {
            Ok(Some(results)) => self.set_solver(path.to_path_buf(), results),
            Ok(None) => {
                self.status_message =
                    Some(format!("No solver results found at {}", path.display()));
            }
            Err(e) => self.report_load_error(e),
        }
    }

    /// Load reference results from a file or directory.
    pub fn load_reference(&mut self, path: &Path) {
        match loader::load_reference_output(path) {
            Ok(results) => self.set_reference(path.to_path_buf(), results),
            Err(e) => self.report_load_error(e),
        }
    }

    fn report_load_error(&mut self, e: anyhow::Error) {
        log::error!("Failed to load file: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }

    pub fn select_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.refresh();
        }
    }

    pub fn set_compare_to_reference(&mut self, on: bool) {
        self.options.compare_to_reference = on;
        self.refresh();
    }

    pub fn set_normalize_scale(&mut self, on: bool) {
        self.options.normalize_scale = on;
        self.refresh();
    }
}
