use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use wakeplot::app::WakePlotApp;
use wakeplot::data::loader;
use wakeplot::figures::{self, FigureKind, PlotOptions};
use wakeplot::state::AppState;

#[derive(Parser)]
#[command(author, version, about = "Compare wake solver results against reference-tool exports")]
struct Args {
    /// Solver results: a wake_solver.{parquet,json,csv} file or its directory
    #[arg(long)]
    solver: Option<PathBuf>,
    /// Reference results: a cst_out.{parquet,json,csv} file or its directory
    #[arg(long)]
    reference: Option<PathBuf>,
    /// Overlay the reference curves
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    compare_to_reference: bool,
    /// Rescale solver impedances to the reference peak
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    normalize_scale: bool,
    /// Print peak and scaling figures to stdout instead of opening a window
    #[arg(long, default_value_t = false)]
    summary: bool,
}

impl Args {
    fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            compare_to_reference: self.compare_to_reference,
            normalize_scale: self.normalize_scale,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.summary {
        return print_summary(&args);
    }

    let mut state = AppState::new(args.plot_options());
    if let Some(path) = &args.solver {
        state.load_solver(path);
    }
    if let Some(path) = &args.reference {
        state.load_reference(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "wakeplot – Wake Comparison Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(WakePlotApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

/// Headless report: every figure's title and peak annotations.
fn print_summary(args: &Args) -> Result<()> {
    let solver_path = args.solver.as_deref().context("--summary needs --solver")?;
    let solver = loader::load_solver_output(solver_path)?
        .with_context(|| format!("no solver results at {}", solver_path.display()))?;

    let overview = figures::overview(&solver)?;
    println!("== {}", overview.title);
    for panel in &overview.panels {
        for line in panel.summary_lines() {
            println!("{line}");
        }
    }

    let Some(reference_path) = args.reference.as_deref() else {
        log::info!("No reference given, skipping comparison figures");
        return Ok(());
    };
    let reference = loader::load_reference_output(reference_path)?;
    let options = args.plot_options();
    for kind in FigureKind::ALL {
        let fig = figures::build(kind, &solver, &reference, options)
            .with_context(|| format!("building {} figure", kind.tab_label()))?;
        println!("== {}", fig.kind.tab_label());
        for line in fig.summary_lines() {
            println!("{line}");
        }
    }
    Ok(())
}
