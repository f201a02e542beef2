use super::error::{WakeError, WakeResult};

// ---------------------------------------------------------------------------
// Peak search and display scaling
// ---------------------------------------------------------------------------

/// A named sequence, so errors can say which quantity was at fault.
#[derive(Debug, Clone, Copy)]
pub struct Trace<'a> {
    pub label: &'a str,
    pub values: &'a [f64],
}

impl<'a> Trace<'a> {
    pub fn new(label: &'a str, values: &'a [f64]) -> Self {
        Self { label, values }
    }
}

/// Index of the global maximum; the first one wins on ties.
///
/// NaN samples never win against a number.
pub fn peak_index(trace: Trace<'_>) -> WakeResult<usize> {
    let mut iter = trace.values.iter().enumerate();
    let (mut best, mut best_value) = match iter.next() {
        Some((i, &v)) => (i, v),
        None => return Err(WakeError::EmptySequence(trace.label.to_string())),
    };
    for (i, &v) in iter {
        if v > best_value || (best_value.is_nan() && !v.is_nan()) {
            best = i;
            best_value = v;
        }
    }
    Ok(best)
}

/// Largest sample of the trace.
pub fn peak_value(trace: Trace<'_>) -> WakeResult<f64> {
    peak_index(trace).map(|i| trace.values[i])
}

/// Largest sample, rejected unless it is a finite number.
fn finite_peak(trace: Trace<'_>) -> WakeResult<f64> {
    let peak = peak_value(trace)?;
    if peak.is_finite() {
        Ok(peak)
    } else {
        Err(WakeError::NonFinitePeak(trace.label.to_string()))
    }
}

/// Factor that lines the candidate's peak up with the reference peak:
/// `max(reference) / max(candidate)`, or exactly `1.0` when not normalizing.
///
/// The returned factor is always finite. A candidate peak so close to zero
/// that the ratio overflows is treated like a zero peak.
pub fn normalization_factor(
    reference: Trace<'_>,
    candidate: Trace<'_>,
    normalize: bool,
) -> WakeResult<f64> {
    if !normalize {
        return Ok(1.0);
    }
    let reference_peak = finite_peak(reference)?;
    let candidate_peak = finite_peak(candidate)?;
    let factor = reference_peak / candidate_peak;
    if candidate_peak == 0.0 || !factor.is_finite() {
        return Err(WakeError::DivisionByZero(candidate.label.to_string()));
    }
    Ok(factor)
}

/// Factor plus the peak positions a plot annotates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleReport {
    pub factor: f64,
    pub candidate_peak: usize,
    /// Only filled in when the reference overlay is drawn.
    pub reference_peak: Option<usize>,
}

/// Compute the display factor and peak indices in one go.
pub fn scale_report(
    reference: Trace<'_>,
    candidate: Trace<'_>,
    normalize: bool,
    with_reference_peak: bool,
) -> WakeResult<ScaleReport> {
    let factor = normalization_factor(reference, candidate, normalize)?;
    let candidate_peak = peak_index(candidate)?;
    let reference_peak = if with_reference_peak {
        Some(peak_index(reference)?)
    } else {
        None
    };
    log::debug!(
        "{} vs {}: factor {factor:.4}, peak at {candidate_peak}",
        candidate.label,
        reference.label
    );
    Ok(ScaleReport {
        factor,
        candidate_peak,
        reference_peak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(values: &[f64]) -> Trace<'_> {
        Trace::new("test", values)
    }

    #[test]
    fn factor_is_identity_without_normalization() {
        assert_eq!(normalization_factor(t(&[1.0, 2.0]), t(&[9.0]), false), Ok(1.0));
        assert_eq!(normalization_factor(t(&[]), t(&[0.0, 0.0]), false), Ok(1.0));
    }

    #[test]
    fn factor_is_ratio_of_peaks() {
        let factor =
            normalization_factor(t(&[1.0, 2.0, 10.0]), t(&[1.0, 2.0, 5.0]), true).unwrap();
        assert_eq!(factor, 2.0);
    }

    #[test]
    fn zero_candidate_peak_is_rejected() {
        let err = normalization_factor(
            Trace::new("Z_cst", &[1.0, 2.0]),
            Trace::new("Z", &[0.0, 0.0, 0.0]),
            true,
        )
        .unwrap_err();
        assert_eq!(err, WakeError::DivisionByZero("Z".into()));
    }

    #[test]
    fn undefined_peaks_are_rejected() {
        let reference = Trace::new("Z_cst", &[1.0, 10.0]);
        assert_eq!(
            normalization_factor(reference, Trace::new("Z", &[f64::NAN, f64::NAN]), true),
            Err(WakeError::NonFinitePeak("Z".into()))
        );
        assert_eq!(
            normalization_factor(Trace::new("Z_cst", &[f64::NAN]), t(&[2.0]), true),
            Err(WakeError::NonFinitePeak("Z_cst".into()))
        );
        assert_eq!(
            normalization_factor(reference, Trace::new("Z", &[f64::INFINITY, 1.0]), true),
            Err(WakeError::NonFinitePeak("Z".into()))
        );
    }

    #[test]
    fn subnormal_candidate_peak_is_rejected() {
        assert_eq!(
            normalization_factor(t(&[1.0, 10.0]), Trace::new("Zx", &[1e-320, 0.0]), true),
            Err(WakeError::DivisionByZero("Zx".into()))
        );
        // the switch still wins over bad data
        assert_eq!(normalization_factor(t(&[f64::NAN]), t(&[1e-320]), false), Ok(1.0));
    }

    #[test]
    fn empty_sequence_has_no_peak() {
        assert_eq!(
            peak_index(Trace::new("Zx", &[])),
            Err(WakeError::EmptySequence("Zx".into()))
        );
        assert!(normalization_factor(t(&[1.0]), t(&[]), true).is_err());
    }

    #[test]
    fn peak_index_prefers_first_of_ties() {
        assert_eq!(peak_index(t(&[1.0, 4.0, 2.0, 4.0])), Ok(1));
        assert_eq!(peak_index(t(&[-3.0, -1.0, -2.0])), Ok(1));
        assert_eq!(peak_index(t(&[f64::NAN, 1.0, 0.5])), Ok(1));
    }

    #[test]
    fn peak_index_dominates_every_sample() {
        let samples = [
            vec![0.0],
            vec![3.0, 1.0, 3.0, -7.0],
            vec![-1.0, -1.0, -1.0],
            vec![0.1, 0.2, 0.3, 0.25, 0.3],
        ];
        for values in &samples {
            let i = peak_index(t(values)).unwrap();
            assert!(values.iter().all(|&v| values[i] >= v));
            assert!(values[..i].iter().all(|&v| v < values[i]));
        }
    }

    #[test]
    fn report_includes_reference_peak_on_request() {
        let reference = t(&[0.0, 8.0, 4.0]);
        let candidate = t(&[2.0, 1.0, 0.0]);
        let without = scale_report(reference, candidate, true, false).unwrap();
        assert_eq!(
            without,
            ScaleReport {
                factor: 4.0,
                candidate_peak: 0,
                reference_peak: None
            }
        );
        let with = scale_report(reference, candidate, false, true).unwrap();
        assert_eq!(with.factor, 1.0);
        assert_eq!(with.reference_peak, Some(1));
    }
}
