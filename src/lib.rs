//! Wake potential and impedance comparison viewer.
//!
//! Loads the wake solver's result file and the reference tool's export,
//! picks the reference run that matches the solver's beam offsets and turns
//! both into figure descriptions drawn by the egui front end.

pub mod app;
pub mod color;
pub mod data;
pub mod figures;
pub mod state;
pub mod ui;
