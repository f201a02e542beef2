use std::fmt;

use super::error::{WakeError, WakeResult};
use super::model::{BeamOffsetConfig, ResultSet};

// ---------------------------------------------------------------------------
// ComparisonVariant – which reference run matches the beam offsets
// ---------------------------------------------------------------------------

/// Reference runs exported from the comparison tool, one per offset case.
///
/// Dipolar cases displace the source beam, quadrupolar cases displace the
/// test beam. "Both" means displaced in X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonVariant {
    OnAxis,
    DipolarX,
    DipolarY,
    DipolarBoth,
    QuadrupolarX,
    QuadrupolarY,
    QuadrupolarBoth,
}

impl ComparisonVariant {
    pub const ALL: [ComparisonVariant; 7] = [
        ComparisonVariant::OnAxis,
        ComparisonVariant::DipolarX,
        ComparisonVariant::DipolarY,
        ComparisonVariant::DipolarBoth,
        ComparisonVariant::QuadrupolarX,
        ComparisonVariant::QuadrupolarY,
        ComparisonVariant::QuadrupolarBoth,
    ];

    /// Pick the variant for a beam-offset configuration.
    ///
    /// Rules are listed from highest to lowest priority: any source offset
    /// selects a dipolar run regardless of the test offset. An offset counts
    /// as present when it is not exactly `0.0`; there is no tolerance, so a
    /// value such as `1e-300` selects an offset run.
    pub fn select(offsets: &BeamOffsetConfig) -> Self {
        let source = (offsets.source_x != 0.0, offsets.source_y != 0.0);
        let test = (offsets.test_x != 0.0, offsets.test_y != 0.0);

        match (source, test) {
            ((true, true), _) => ComparisonVariant::DipolarBoth,
            ((false, true), _) => ComparisonVariant::DipolarY,
            ((true, false), _) => ComparisonVariant::DipolarX,
            (_, (true, true)) => ComparisonVariant::QuadrupolarBoth,
            (_, (false, true)) => ComparisonVariant::QuadrupolarY,
            (_, (true, false)) => ComparisonVariant::QuadrupolarX,
            _ => ComparisonVariant::OnAxis,
        }
    }

    pub fn is_on_axis(self) -> bool {
        self == ComparisonVariant::OnAxis
    }

    /// Infix used in the per-quantity reference keys, e.g. `WPx_dipolarX_cst`.
    fn quantity_infix(self) -> Option<&'static str> {
        match self {
            ComparisonVariant::OnAxis => None,
            ComparisonVariant::DipolarX => Some("dipolarX"),
            ComparisonVariant::DipolarY => Some("dipolarY"),
            ComparisonVariant::DipolarBoth => Some("dipolar"),
            ComparisonVariant::QuadrupolarX => Some("quadrupolarX"),
            ComparisonVariant::QuadrupolarY => Some("quadrupolarY"),
            ComparisonVariant::QuadrupolarBoth => Some("quadrupolar"),
        }
    }

    /// Suffix of the shared axis key; X, Y and both-plane runs of the same
    /// family share one sampling grid.
    fn axis_suffix(self) -> Option<&'static str> {
        match self {
            ComparisonVariant::OnAxis => None,
            ComparisonVariant::DipolarX
            | ComparisonVariant::DipolarY
            | ComparisonVariant::DipolarBoth => Some("dipolar"),
            ComparisonVariant::QuadrupolarX
            | ComparisonVariant::QuadrupolarY
            | ComparisonVariant::QuadrupolarBoth => Some("quadrupolar"),
        }
    }

    /// Reference keys `(axis, x-component, y-component)` for a quantity.
    pub fn reference_keys(self, quantity: TransverseQuantity) -> [String; 3] {
        let (axis, x, y) = quantity.key_stems();
        let axis_key = match self.axis_suffix() {
            Some(suffix) => format!("{axis}_{suffix}"),
            None => axis.to_string(),
        };
        let component = |stem: &str| match self.quantity_infix() {
            Some(infix) => format!("{stem}_{infix}_cst"),
            None => format!("{stem}_cst"),
        };
        [axis_key, component(x), component(y)]
    }
}

impl fmt::Display for ComparisonVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComparisonVariant::OnAxis => "on-axis",
            ComparisonVariant::DipolarX => "dipolar-X",
            ComparisonVariant::DipolarY => "dipolar-Y",
            ComparisonVariant::DipolarBoth => "dipolar-XY",
            ComparisonVariant::QuadrupolarX => "quadrupolar-X",
            ComparisonVariant::QuadrupolarY => "quadrupolar-Y",
            ComparisonVariant::QuadrupolarBoth => "quadrupolar-XY",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Reference lookup
// ---------------------------------------------------------------------------

/// Transverse quantity whose reference arrays depend on the offset case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransverseQuantity {
    WakePotential,
    Impedance,
}

impl TransverseQuantity {
    fn key_stems(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TransverseQuantity::WakePotential => ("s_cst", "WPx", "WPy"),
            TransverseQuantity::Impedance => ("freq_cst", "Zx", "Zy"),
        }
    }
}

/// Reference arrays matching one beam-offset case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceSelection<'a> {
    pub variant: ComparisonVariant,
    /// Position (m) or frequency (Hz) axis.
    pub axis: &'a [f64],
    pub x: &'a [f64],
    pub y: &'a [f64],
}

/// Choose the variant for `offsets` and pull its arrays out of `reference`.
pub fn select_reference<'a>(
    reference: &'a ResultSet,
    offsets: &BeamOffsetConfig,
    quantity: TransverseQuantity,
) -> WakeResult<ReferenceSelection<'a>> {
    let variant = ComparisonVariant::select(offsets);
    log::debug!("beam offsets {offsets:?} -> {variant} reference");
    let [axis_key, x_key, y_key] = variant.reference_keys(quantity);

    let fetch = |key: &str| -> WakeResult<&'a [f64]> {
        match reference.array(key) {
            Err(WakeError::MissingKey(key)) if !variant.is_on_axis() => {
                Err(WakeError::MissingVariant {
                    variant: variant.to_string(),
                    key,
                })
            }
            other => other,
        }
    };

    Ok(ReferenceSelection {
        variant,
        axis: fetch(&axis_key)?,
        x: fetch(&x_key)?,
        y: fetch(&y_key)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ResultValue;

    const MM: f64 = 1e-3;

    fn offsets(source_x: f64, source_y: f64, test_x: f64, test_y: f64) -> BeamOffsetConfig {
        BeamOffsetConfig {
            source_x,
            source_y,
            test_x,
            test_y,
        }
    }

    #[test]
    fn all_zero_offsets_select_on_axis() {
        assert_eq!(
            ComparisonVariant::select(&BeamOffsetConfig::on_axis()),
            ComparisonVariant::OnAxis
        );
        assert_eq!(
            ComparisonVariant::select(&offsets(-0.0, 0.0, -0.0, 0.0)),
            ComparisonVariant::OnAxis
        );
    }

    #[test]
    fn test_offset_selects_quadrupolar() {
        assert_eq!(
            ComparisonVariant::select(&offsets(0.0, 0.0, 5.0 * MM, 0.0)),
            ComparisonVariant::QuadrupolarX
        );
        assert_eq!(
            ComparisonVariant::select(&offsets(0.0, 0.0, 0.0, 5.0 * MM)),
            ComparisonVariant::QuadrupolarY
        );
        assert_eq!(
            ComparisonVariant::select(&offsets(0.0, 0.0, 5.0 * MM, 5.0 * MM)),
            ComparisonVariant::QuadrupolarBoth
        );
    }

    #[test]
    fn source_offset_overrides_test_offset() {
        assert_eq!(
            ComparisonVariant::select(&offsets(3.0 * MM, 0.0, 5.0 * MM, 0.0)),
            ComparisonVariant::DipolarX
        );
        assert_eq!(
            ComparisonVariant::select(&offsets(0.0, 3.0 * MM, 5.0 * MM, 5.0 * MM)),
            ComparisonVariant::DipolarY
        );
        assert_eq!(
            ComparisonVariant::select(&offsets(3.0 * MM, 3.0 * MM, 0.0, 5.0 * MM)),
            ComparisonVariant::DipolarBoth
        );
    }

    #[test]
    fn tiny_offsets_are_not_rounded_to_zero() {
        assert_eq!(
            ComparisonVariant::select(&offsets(0.0, 0.0, 1e-300, 0.0)),
            ComparisonVariant::QuadrupolarX
        );
    }

    #[test]
    fn reference_key_vocabulary() {
        assert_eq!(
            ComparisonVariant::OnAxis.reference_keys(TransverseQuantity::WakePotential),
            ["s_cst", "WPx_cst", "WPy_cst"]
        );
        assert_eq!(
            ComparisonVariant::DipolarBoth.reference_keys(TransverseQuantity::Impedance),
            ["freq_cst_dipolar", "Zx_dipolar_cst", "Zy_dipolar_cst"]
        );
        assert_eq!(
            ComparisonVariant::QuadrupolarY.reference_keys(TransverseQuantity::WakePotential),
            ["s_cst_quadrupolar", "WPx_quadrupolarY_cst", "WPy_quadrupolarY_cst"]
        );
    }

    fn reference() -> ResultSet {
        ResultSet::from_pairs([
            ("s_cst", ResultValue::Array(vec![0.0, 1.0])),
            ("WPx_cst", ResultValue::Array(vec![0.0, 0.1])),
            ("WPy_cst", ResultValue::Array(vec![0.0, 0.2])),
            ("s_cst_quadrupolar", ResultValue::Array(vec![0.0, 1.0, 2.0])),
            ("WPx_quadrupolarX_cst", ResultValue::Array(vec![1.0, 2.0, 3.0])),
            ("WPy_quadrupolarX_cst", ResultValue::Array(vec![4.0, 5.0, 6.0])),
        ])
    }

    #[test]
    fn selection_pulls_variant_arrays() {
        let reference = reference();
        let sel = select_reference(
            &reference,
            &offsets(0.0, 0.0, 5.0 * MM, 0.0),
            TransverseQuantity::WakePotential,
        )
        .unwrap();
        assert_eq!(sel.variant, ComparisonVariant::QuadrupolarX);
        assert_eq!(sel.axis, &[0.0, 1.0, 2.0]);
        assert_eq!(sel.x, &[1.0, 2.0, 3.0]);
        assert_eq!(sel.y, &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn selection_is_repeatable() {
        let reference = reference();
        let cfg = offsets(0.0, 0.0, 0.0, 0.0);
        let first = select_reference(&reference, &cfg, TransverseQuantity::WakePotential);
        let second = select_reference(&reference, &cfg, TransverseQuantity::WakePotential);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().x, &[0.0, 0.1]);
    }

    #[test]
    fn absent_variant_is_reported() {
        let reference = reference();
        let err = select_reference(
            &reference,
            &offsets(3.0 * MM, 0.0, 0.0, 0.0),
            TransverseQuantity::WakePotential,
        )
        .unwrap_err();
        assert_eq!(
            err,
            WakeError::MissingVariant {
                variant: "dipolar-X".into(),
                key: "s_cst_dipolar".into(),
            }
        );
    }

    #[test]
    fn absent_on_axis_key_is_a_missing_key() {
        let reference = reference();
        let err = select_reference(
            &reference,
            &BeamOffsetConfig::on_axis(),
            TransverseQuantity::Impedance,
        )
        .unwrap_err();
        assert_eq!(err, WakeError::MissingKey("freq_cst".into()));
    }
}
