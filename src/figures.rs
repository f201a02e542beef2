use crate::color::TraceColor;
use crate::data::error::{WakeError, WakeResult};
use crate::data::model::{BeamOffsetConfig, ResultSet};
use crate::data::normalize::{Trace, peak_index, peak_value, scale_report};
use crate::data::selector::{TransverseQuantity, select_reference};

/// Metres → millimetres.
pub const MM_PER_M: f64 = 1e3;
/// Hertz → gigahertz.
pub const GHZ_PER_HZ: f64 = 1e-9;

/// Headroom above the tallest impedance peak.
const Y_HEADROOM: f64 = 1.2;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// The two switches every figure honours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotOptions {
    /// Overlay the reference-tool curves.
    pub compare_to_reference: bool,
    /// Rescale solver impedances so their peaks match the reference.
    pub normalize_scale: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            compare_to_reference: true,
            normalize_scale: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Figure description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureKind {
    LongitudinalWake,
    LongitudinalImpedance,
    TransverseWake,
    TransverseImpedance,
}

impl FigureKind {
    pub const ALL: [FigureKind; 4] = [
        FigureKind::LongitudinalWake,
        FigureKind::LongitudinalImpedance,
        FigureKind::TransverseWake,
        FigureKind::TransverseImpedance,
    ];

    pub fn tab_label(self) -> &'static str {
        match self {
            FigureKind::LongitudinalWake => "W|| (s)",
            FigureKind::LongitudinalImpedance => "Z|| (f)",
            FigureKind::TransverseWake => "W⊥ (s)",
            FigureKind::TransverseImpedance => "Z⊥ (f)",
        }
    }
}

/// One curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: TraceColor,
    pub width: f32,
    pub dashed: bool,
    /// Draw a small square on every sample.
    pub show_points: bool,
}

/// Annotated peak location.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakMarker {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub color: TraceColor,
    pub label_color: TraceColor,
    pub radius: f32,
    /// Label offset from the marker, in screen points.
    pub label_offset: [f32; 2],
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: FigureKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub markers: Vec<PeakMarker>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
}

impl Figure {
    fn new(kind: FigureKind, title: String, x_label: &str, y_label: &str) -> Self {
        Self {
            kind,
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            markers: Vec::new(),
            x_range: None,
            y_range: None,
        }
    }

    /// Initial view window as `(min, max)` corners.
    ///
    /// Fixed ranges are used where the figure has them; a free axis spans the
    /// finite samples that fall inside the other axis' window, with a 5 %
    /// margin. `None` when there is nothing finite to show.
    pub fn view_bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let points = || {
            self.series
                .iter()
                .flat_map(|s| s.x.iter().copied().zip(s.y.iter().copied()))
                .chain(self.markers.iter().map(|m| (m.x, m.y)))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
        };

        let (x_lo, x_hi) = match self.x_range {
            Some(range) => range,
            None => with_margin(span(points().map(|(x, _)| x))?),
        };
        let (y_lo, y_hi) = match self.y_range {
            Some(range) => range,
            None => with_margin(span(
                points()
                    .filter(|&(x, _)| x >= x_lo && x <= x_hi)
                    .map(|(_, y)| y),
            )?),
        };
        Some(([x_lo, y_lo], [x_hi, y_hi]))
    }

    /// Plain-text digest: title, then one line per peak marker.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![self.title.replace('\n', " ")];
        for marker in &self.markers {
            lines.push(format!(
                "  peak {:>10} at ({:.4}, {:.4e})",
                marker.label, marker.x, marker.y
            ));
        }
        lines
    }
}

/// Solver-only 2×2 grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub title: String,
    pub panels: [Figure; 4],
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scaled(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|v| v * factor).collect()
}

fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn with_margin((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = if hi > lo { 0.05 * (hi - lo) } else { 1.0 };
    (lo - pad, hi + pad)
}

fn min_value(trace: Trace<'_>) -> WakeResult<f64> {
    if trace.values.is_empty() {
        return Err(WakeError::EmptySequence(trace.label.to_string()));
    }
    Ok(trace.values.iter().copied().fold(f64::INFINITY, f64::min))
}

fn same_length(values: Trace<'_>, axis: Trace<'_>) -> WakeResult<()> {
    if values.values.len() == axis.values.len() {
        Ok(())
    } else {
        Err(WakeError::LengthMismatch {
            key: values.label.to_string(),
            len: values.values.len(),
            axis: axis.label.to_string(),
            axis_len: axis.values.len(),
        })
    }
}

/// `[min(s), min(max(s), max(s_ref))]` in millimetres.
fn clipped_position_range(s: Trace<'_>, s_ref: Trace<'_>) -> WakeResult<(f64, f64)> {
    let lo = min_value(s)?;
    let hi = peak_value(s)?.min(peak_value(s_ref)?);
    Ok((lo * MM_PER_M, hi * MM_PER_M))
}

fn frequency_range(freq: Trace<'_>) -> WakeResult<(f64, f64)> {
    Ok((0.0, peak_value(freq)? * GHZ_PER_HZ))
}

fn ghz_label(freq_hz: f64) -> String {
    format!("{:.2} GHz", freq_hz * GHZ_PER_HZ)
}

fn position_series(
    label: &str,
    s: &[f64],
    values: &[f64],
    color: TraceColor,
    dashed: bool,
) -> Series {
    Series {
        label: label.to_string(),
        x: scaled(s, MM_PER_M),
        y: values.to_vec(),
        color,
        width: 1.2,
        dashed,
        show_points: false,
    }
}

fn impedance_series(
    label: &str,
    freq: &[f64],
    values: &[f64],
    factor: f64,
    color: TraceColor,
    dashed: bool,
) -> Series {
    Series {
        label: label.to_string(),
        x: scaled(freq, GHZ_PER_HZ),
        y: scaled(values, factor),
        color,
        width: if dashed { 1.2 } else { 1.0 },
        dashed,
        show_points: true,
    }
}

/// Marker on sample `index` of an impedance curve.
fn impedance_peak(
    freq: &[f64],
    values: &[f64],
    index: usize,
    factor: f64,
    color: TraceColor,
    label_color: TraceColor,
    label_offset: [f32; 2],
) -> PeakMarker {
    PeakMarker {
        x: freq[index] * GHZ_PER_HZ,
        y: values[index] * factor,
        label: ghz_label(freq[index]),
        color,
        label_color,
        radius: 4.0,
        label_offset,
    }
}

fn offsets_caption(offsets: &BeamOffsetConfig) -> String {
    format!(
        "source (x, y) = ({:.2}, {:.2}) mm | test (x, y) = ({:.2}, {:.2}) mm",
        offsets.source_x * MM_PER_M,
        offsets.source_y * MM_PER_M,
        offsets.test_x * MM_PER_M,
        offsets.test_y * MM_PER_M,
    )
}

fn normalized_title(base: &str, factor: f64, normalize: bool) -> String {
    if normalize {
        format!("{base}\n[normalized by {factor:.3}]")
    } else {
        base.to_string()
    }
}

// ---------------------------------------------------------------------------
// Comparison figures
// ---------------------------------------------------------------------------

/// Longitudinal wake potential W||(s), optionally against the reference.
pub fn longitudinal_wake(
    solver: &ResultSet,
    reference: &ResultSet,
    options: PlotOptions,
) -> WakeResult<Figure> {
    let s = Trace::new("s", solver.array("s")?);
    let wp = Trace::new("WP", solver.array("WP")?);
    let s_ref = Trace::new("s_cst", reference.array("s_cst")?);
    same_length(wp, s)?;

    let mut fig = Figure::new(
        FigureKind::LongitudinalWake,
        "Longitudinal wake potential W||(s)".into(),
        "s [mm]",
        "W||(s) [V/pC]",
    );
    fig.series.push(position_series(
        "W||(0,0)(s)",
        s.values,
        wp.values,
        TraceColor::Orange,
        false,
    ));
    if options.compare_to_reference {
        let wp_ref = Trace::new("WP_cst", reference.array("WP_cst")?);
        same_length(wp_ref, s_ref)?;
        let mut series =
            position_series("W||(s) CST", s_ref.values, wp_ref.values, TraceColor::Black, true);
        series.width = 1.3;
        fig.series.push(series);
    }
    fig.x_range = Some(clipped_position_range(s, s_ref)?);
    Ok(fig)
}

/// Longitudinal impedance Z||(f) with its peak frequency annotated.
pub fn longitudinal_impedance(
    solver: &ResultSet,
    reference: &ResultSet,
    options: PlotOptions,
) -> WakeResult<Figure> {
    let freq = Trace::new("f", solver.array("f")?);
    let z = Trace::new("Z", solver.array("Z")?);
    let freq_ref = Trace::new("freq_cst", reference.array("freq_cst")?);
    let z_ref = Trace::new("Z_cst", reference.array("Z_cst")?);
    same_length(z, freq)?;
    same_length(z_ref, freq_ref)?;

    let report = scale_report(
        z_ref,
        z,
        options.normalize_scale,
        options.compare_to_reference,
    )?;

    let mut fig = Figure::new(
        FigureKind::LongitudinalImpedance,
        normalized_title(
            "Longitudinal impedance Z||(ω)",
            report.factor,
            options.normalize_scale,
        ),
        "f [GHz]",
        "Z||(ω) [Ω]",
    );
    fig.markers.push(impedance_peak(
        freq.values,
        z.values,
        report.candidate_peak,
        report.factor,
        TraceColor::Blue,
        TraceColor::Blue,
        [-20.0, 5.0],
    ));
    fig.series.push(impedance_series(
        "Z||(ω)",
        freq.values,
        z.values,
        report.factor,
        TraceColor::Blue,
        false,
    ));
    if let Some(peak) = report.reference_peak {
        let mut marker = impedance_peak(
            freq_ref.values,
            z_ref.values,
            peak,
            1.0,
            TraceColor::Red,
            TraceColor::Red,
            [20.0, 5.0],
        );
        marker.radius = 5.0;
        fig.markers.push(marker);
        fig.series.push(impedance_series(
            "Z||(ω) from CST",
            freq_ref.values,
            z_ref.values,
            1.0,
            TraceColor::Red,
            false,
        ));
    }
    fig.y_range = Some((0.0, peak_value(z_ref)? * Y_HEADROOM));
    fig.x_range = Some(frequency_range(freq_ref)?);
    Ok(fig)
}

/// Transverse wake potentials Wx⊥(s), Wy⊥(s) against the reference run that
/// matches the solver's beam offsets.
pub fn transverse_wake(
    solver: &ResultSet,
    reference: &ResultSet,
    options: PlotOptions,
) -> WakeResult<Figure> {
    let s = Trace::new("s", solver.array("s")?);
    let wpx = Trace::new("WPx", solver.array("WPx")?);
    let wpy = Trace::new("WPy", solver.array("WPy")?);
    same_length(wpx, s)?;
    same_length(wpy, s)?;
    let offsets = solver.beam_offsets()?;

    let selection = select_reference(reference, &offsets, TransverseQuantity::WakePotential)?;
    let s_ref = Trace::new("s_cst", selection.axis);

    let mut fig = Figure::new(
        FigureKind::TransverseWake,
        format!(
            "Transverse wake potential W⊥(s) [{} reference]\n{}",
            selection.variant,
            offsets_caption(&offsets)
        ),
        "s [mm]",
        "W⊥ [V/pC]",
    );
    let components = [
        ("Wx⊥(s)", wpx, selection.x, TraceColor::Green),
        ("Wy⊥(s)", wpy, selection.y, TraceColor::Magenta),
    ];
    for (label, solver_trace, reference_values, color) in components {
        fig.series
            .push(position_series(label, s.values, solver_trace.values, color, false));
        if options.compare_to_reference {
            same_length(Trace::new(label, reference_values), s_ref)?;
            fig.series.push(position_series(
                &format!("{label} from CST"),
                s_ref.values,
                reference_values,
                color,
                true,
            ));
        }
    }
    fig.x_range = Some(clipped_position_range(s, s_ref)?);
    Ok(fig)
}

/// Transverse impedances Zx⊥(f), Zy⊥(f).
///
/// X and Y get their own normalization factor, but the title reports the X
/// factor only.
pub fn transverse_impedance(
    solver: &ResultSet,
    reference: &ResultSet,
    options: PlotOptions,
) -> WakeResult<Figure> {
    let freq = Trace::new("f", solver.array("f")?);
    let zx = Trace::new("Zx", solver.array("Zx")?);
    let zy = Trace::new("Zy", solver.array("Zy")?);
    same_length(zx, freq)?;
    same_length(zy, freq)?;
    let offsets = solver.beam_offsets()?;

    let selection = select_reference(reference, &offsets, TransverseQuantity::Impedance)?;
    let freq_ref = Trace::new("freq_cst", selection.axis);
    let zx_ref = Trace::new("Zx_cst", selection.x);
    let zy_ref = Trace::new("Zy_cst", selection.y);
    same_length(zx_ref, freq_ref)?;
    same_length(zy_ref, freq_ref)?;

    let compare = options.compare_to_reference;
    let report_x = scale_report(zx_ref, zx, options.normalize_scale, compare)?;
    let report_y = scale_report(zy_ref, zy, options.normalize_scale, compare)?;

    let mut fig = Figure::new(
        FigureKind::TransverseImpedance,
        normalized_title(
            &format!("Transverse impedance Z⊥(ω) [{} reference]", selection.variant),
            report_x.factor,
            options.normalize_scale,
        ),
        "f [GHz]",
        "Z⊥(ω) [Ω]",
    );

    let components = [
        ("Zx⊥(ω)", zx, zx_ref, report_x, TraceColor::Green),
        ("Zy⊥(ω)", zy, zy_ref, report_y, TraceColor::Magenta),
    ];
    for (label, values, reference_values, report, color) in components {
        fig.markers.push(impedance_peak(
            freq.values,
            values.values,
            report.candidate_peak,
            report.factor,
            color,
            TraceColor::Grey,
            [-10.0, 5.0],
        ));
        fig.series.push(impedance_series(
            label,
            freq.values,
            values.values,
            report.factor,
            color,
            false,
        ));
        if let Some(peak) = report.reference_peak {
            let mut marker = impedance_peak(
                freq_ref.values,
                reference_values.values,
                peak,
                1.0,
                TraceColor::Black,
                TraceColor::Black,
                [20.0, 5.0],
            );
            marker.radius = 5.0;
            fig.markers.push(marker);
            fig.series.push(impedance_series(
                &format!("{label} from CST"),
                freq_ref.values,
                reference_values.values,
                1.0,
                TraceColor::Black,
                true,
            ));
        }
    }
    fig.x_range = Some(frequency_range(freq_ref)?);
    Ok(fig)
}

/// Build one of the four comparison figures.
pub fn build(
    kind: FigureKind,
    solver: &ResultSet,
    reference: &ResultSet,
    options: PlotOptions,
) -> WakeResult<Figure> {
    match kind {
        FigureKind::LongitudinalWake => longitudinal_wake(solver, reference, options),
        FigureKind::LongitudinalImpedance => longitudinal_impedance(solver, reference, options),
        FigureKind::TransverseWake => transverse_wake(solver, reference, options),
        FigureKind::TransverseImpedance => transverse_impedance(solver, reference, options),
    }
}

// ---------------------------------------------------------------------------
// Solver-only overview
// ---------------------------------------------------------------------------

/// The four solver quantities side by side, without reference data.
pub fn overview(solver: &ResultSet) -> WakeResult<Overview> {
    let s = Trace::new("s", solver.array("s")?);
    let freq = Trace::new("f", solver.array("f")?);
    let wp = Trace::new("WP", solver.array("WP")?);
    let wpx = Trace::new("WPx", solver.array("WPx")?);
    let wpy = Trace::new("WPy", solver.array("WPy")?);
    let z = Trace::new("Z", solver.array("Z")?);
    let zx = Trace::new("Zx", solver.array("Zx")?);
    let zy = Trace::new("Zy", solver.array("Zy")?);
    for trace in [wp, wpx, wpy] {
        same_length(trace, s)?;
    }
    for trace in [z, zx, zy] {
        same_length(trace, freq)?;
    }
    let offsets = solver.beam_offsets()?;
    let f_range = frequency_range(freq)?;

    let mut long_wake = Figure::new(
        FigureKind::LongitudinalWake,
        "Longitudinal wake potential W||(s)".into(),
        "s [mm]",
        "W||(s) [V/pC]",
    );
    long_wake.series.push(position_series(
        "W||(0,0)(s)",
        s.values,
        wp.values,
        TraceColor::Orange,
        false,
    ));

    let mut long_z = Figure::new(
        FigureKind::LongitudinalImpedance,
        "Longitudinal impedance Z||(ω)".into(),
        "f [GHz]",
        "Z||(ω) [Ω]",
    );
    let z_peak = peak_index(z)?;
    long_z.markers.push(impedance_peak(
        freq.values,
        z.values,
        z_peak,
        1.0,
        TraceColor::Blue,
        TraceColor::Blue,
        [-20.0, 5.0],
    ));
    long_z.series.push(impedance_series(
        "Z||(ω)",
        freq.values,
        z.values,
        1.0,
        TraceColor::Blue,
        false,
    ));
    long_z.y_range = Some((0.0, peak_value(z)? * Y_HEADROOM));
    long_z.x_range = Some(f_range);

    let mut trans_wake = Figure::new(
        FigureKind::TransverseWake,
        format!("Transverse wake potential W⊥(s)\n{}", offsets_caption(&offsets)),
        "s [mm]",
        "W⊥ [V/pC]",
    );
    trans_wake.series.push(position_series(
        "Wx⊥(s)",
        s.values,
        wpx.values,
        TraceColor::Green,
        false,
    ));
    trans_wake.series.push(position_series(
        "Wy⊥(s)",
        s.values,
        wpy.values,
        TraceColor::Magenta,
        false,
    ));

    let mut trans_z = Figure::new(
        FigureKind::TransverseImpedance,
        "Transverse impedance Z⊥(ω)".into(),
        "f [GHz]",
        "Z⊥(ω) [Ω]",
    );
    for (label, trace, color) in [
        ("Zx⊥(ω)", zx, TraceColor::Green),
        ("Zy⊥(ω)", zy, TraceColor::Magenta),
    ] {
        let peak = peak_index(trace)?;
        trans_z.markers.push(impedance_peak(
            freq.values,
            trace.values,
            peak,
            1.0,
            color,
            color,
            [-10.0, 5.0],
        ));
        trans_z
            .series
            .push(impedance_series(label, freq.values, trace.values, 1.0, color, false));
    }
    let z_max = peak_value(zx)?.max(peak_value(zy)?);
    trans_z.y_range = Some((0.0, z_max * Y_HEADROOM));
    trans_z.x_range = Some(f_range);

    Ok(Overview {
        title: "Wake solver results".into(),
        panels: [long_wake, long_z, trans_wake, trans_z],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ResultValue;
    use crate::data::selector::ComparisonVariant;

    const MM: f64 = 1e-3;
    const GHZ: f64 = 1e9;

    fn arr(values: &[f64]) -> ResultValue {
        ResultValue::Array(values.to_vec())
    }

    fn solver(source_x: f64, test_x: f64) -> ResultSet {
        ResultSet::from_pairs([
            ("s", arr(&[0.0, 1.0 * MM, 2.0 * MM, 3.0 * MM])),
            ("WP", arr(&[0.0, 5.0, 10.0, 3.0])),
            ("WPx", arr(&[0.0, 1.0, 2.0, 1.0])),
            ("WPy", arr(&[0.0, -1.0, -2.0, -1.0])),
            ("f", arr(&[0.0, 1.0 * GHZ, 2.0 * GHZ])),
            ("Z", arr(&[1.0, 2.0, 5.0])),
            ("Zx", arr(&[0.5, 4.0, 4.0])),
            ("Zy", arr(&[3.0, 1.0, 0.0])),
            ("xsource", ResultValue::Scalar(source_x)),
            ("ysource", ResultValue::Scalar(0.0)),
            ("xtest", ResultValue::Scalar(test_x)),
            ("ytest", ResultValue::Scalar(0.0)),
        ])
    }

    fn reference() -> ResultSet {
        ResultSet::from_pairs([
            ("s_cst", arr(&[0.0, 1.0 * MM, 2.0 * MM])),
            ("WP_cst", arr(&[0.0, 4.0, 9.0])),
            ("WPx_cst", arr(&[0.0, 0.9, 1.9])),
            ("WPy_cst", arr(&[0.0, -0.9, -1.9])),
            ("freq_cst", arr(&[0.0, 1.5 * GHZ, 3.0 * GHZ])),
            ("Z_cst", arr(&[1.0, 10.0, 2.0])),
            ("Zx_cst", arr(&[2.0, 8.0, 1.0])),
            ("Zy_cst", arr(&[9.0, 1.0, 0.0])),
            ("s_cst_dipolar", arr(&[0.0, 4.0 * MM])),
            ("WPx_dipolarX_cst", arr(&[0.0, 7.0])),
            ("WPy_dipolarX_cst", arr(&[0.0, 0.1])),
        ])
    }

    fn compare(normalize_scale: bool) -> PlotOptions {
        PlotOptions {
            compare_to_reference: true,
            normalize_scale,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn longitudinal_wake_clips_to_shorter_axis() {
        let fig = longitudinal_wake(&solver(0.0, 0.0), &reference(), compare(false)).unwrap();
        let (lo, hi) = fig.x_range.unwrap();
        assert_close(lo, 0.0);
        assert_close(hi, 2.0);
        assert_eq!(fig.series.len(), 2);
        assert!(fig.series[1].dashed);
        assert_close(fig.series[0].x[3], 3.0);
    }

    #[test]
    fn longitudinal_wake_without_overlay_still_clips() {
        let options = PlotOptions {
            compare_to_reference: false,
            normalize_scale: false,
        };
        let fig = longitudinal_wake(&solver(0.0, 0.0), &reference(), options).unwrap();
        assert_eq!(fig.series.len(), 1);
        assert_close(fig.x_range.unwrap().1, 2.0);
    }

    #[test]
    fn longitudinal_impedance_is_normalized_to_reference_peak() {
        let fig =
            longitudinal_impedance(&solver(0.0, 0.0), &reference(), compare(true)).unwrap();
        assert!(fig.title.ends_with("[normalized by 2.000]"));
        assert_eq!(fig.series[0].y, vec![2.0, 4.0, 10.0]);
        assert_eq!(fig.markers.len(), 2);
        assert_eq!(fig.markers[0].label, "2.00 GHz");
        assert_close(fig.markers[0].y, 10.0);
        assert_eq!(fig.markers[1].label, "1.50 GHz");
        assert_close(fig.y_range.unwrap().1, 12.0);
        assert_close(fig.x_range.unwrap().1, 3.0);
    }

    #[test]
    fn longitudinal_impedance_without_normalization() {
        let options = PlotOptions {
            compare_to_reference: false,
            normalize_scale: false,
        };
        let fig = longitudinal_impedance(&solver(0.0, 0.0), &reference(), options).unwrap();
        assert_eq!(fig.title, "Longitudinal impedance Z||(ω)");
        assert_eq!(fig.series.len(), 1);
        assert_eq!(fig.markers.len(), 1);
        assert_eq!(fig.series[0].y, vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn zero_impedance_cannot_be_normalized() {
        let mut pairs: Vec<(String, ResultValue)> = solver(0.0, 0.0)
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        for (key, value) in &mut pairs {
            if key == "Z" {
                *value = arr(&[0.0, 0.0, 0.0]);
            }
        }
        let solver = ResultSet::from_pairs(pairs);
        let err = longitudinal_impedance(&solver, &reference(), compare(true)).unwrap_err();
        assert_eq!(err, WakeError::DivisionByZero("Z".into()));
    }

    #[test]
    fn transverse_wake_uses_dipolar_reference_for_source_offset() {
        let fig =
            transverse_wake(&solver(3.0 * MM, 5.0 * MM), &reference(), compare(false)).unwrap();
        assert!(fig.title.contains(&ComparisonVariant::DipolarX.to_string()));
        assert!(fig.title.contains("source (x, y) = (3.00, 0.00) mm"));
        let reference_x = &fig.series[1];
        assert_eq!(reference_x.label, "Wx⊥(s) from CST");
        assert_eq!(reference_x.y, vec![0.0, 7.0]);
        assert_close(fig.x_range.unwrap().1, 3.0);
    }

    #[test]
    fn transverse_wake_reports_missing_variant() {
        let err =
            transverse_wake(&solver(0.0, 5.0 * MM), &reference(), compare(false)).unwrap_err();
        assert!(matches!(err, WakeError::MissingVariant { .. }));
    }

    #[test]
    fn transverse_impedance_titles_x_factor() {
        let fig =
            transverse_impedance(&solver(0.0, 0.0), &reference(), compare(true)).unwrap();
        assert!(fig.title.ends_with("[normalized by 2.000]"));
        // Zx: 8 / 4, Zy: 9 / 3; the title carries only the x factor
        assert!(!fig.title.contains("3.000"));
        assert_eq!(fig.series[0].y, vec![1.0, 8.0, 8.0]);
        assert_eq!(fig.series[2].y, vec![9.0, 3.0, 0.0]);
        // first of the tied Zx maxima
        assert_eq!(fig.markers[0].label, "1.00 GHz");
        assert_eq!(fig.markers.len(), 4);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let solver = ResultSet::from_pairs([
            ("s", arr(&[0.0, 1.0])),
            ("WP", arr(&[0.0, 1.0, 2.0])),
        ]);
        let err = longitudinal_wake(&solver, &reference(), compare(false)).unwrap_err();
        assert!(matches!(err, WakeError::LengthMismatch { len: 3, axis_len: 2, .. }));
    }

    #[test]
    fn overview_needs_no_reference() {
        let overview = overview(&solver(0.0, 0.0)).unwrap();
        let [_, long_z, _, trans_z] = &overview.panels;
        assert_close(long_z.y_range.unwrap().1, 6.0);
        assert_eq!(trans_z.markers.len(), 2);
        assert_close(trans_z.y_range.unwrap().1, 4.8);
        assert!(overview.panels.iter().all(|p| p
            .series
            .iter()
            .all(|s| !s.dashed)));
    }

    #[test]
    fn view_bounds_use_fixed_x_and_fit_y_inside_it() {
        let fig = longitudinal_wake(&solver(0.0, 0.0), &reference(), compare(false)).unwrap();
        let ([x_lo, y_lo], [x_hi, y_hi]) = fig.view_bounds().unwrap();
        assert_close(x_lo, 0.0);
        assert_close(x_hi, 2.0);
        // WP spans 0..10 inside the window, plus 5 %
        assert_close(y_lo, -0.5);
        assert_close(y_hi, 10.5);
    }

    #[test]
    fn view_bounds_keep_fixed_y_range() {
        let fig =
            longitudinal_impedance(&solver(0.0, 0.0), &reference(), compare(true)).unwrap();
        let (min, max) = fig.view_bounds().unwrap();
        assert_eq!(min, [0.0, 0.0]);
        assert_close(max[0], 3.0);
        assert_close(max[1], 12.0);
    }

    #[test]
    fn view_bounds_skip_non_finite_samples() {
        let mut fig = Figure::new(FigureKind::LongitudinalWake, String::new(), "x", "y");
        assert_eq!(fig.view_bounds(), None);
        fig.series.push(position_series(
            "WP",
            &[0.0, 1.0 * MM, 2.0 * MM],
            &[f64::NAN, 2.0, 2.0],
            TraceColor::Orange,
            false,
        ));
        let ([x_lo, y_lo], [x_hi, y_hi]) = fig.view_bounds().unwrap();
        assert_close(x_lo, 0.95);
        assert_close(x_hi, 2.05);
        assert_close(y_lo, 1.0);
        assert_close(y_hi, 3.0);
    }

    #[test]
    fn summary_flattens_title() {
        let fig =
            longitudinal_impedance(&solver(0.0, 0.0), &reference(), compare(true)).unwrap();
        let lines = fig.summary_lines();
        assert_eq!(lines.len(), 3);
        assert!(!lines[0].contains('\n'));
    }
}
