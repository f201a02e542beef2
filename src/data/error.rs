use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain errors raised while pulling quantities out of result sets
// ---------------------------------------------------------------------------

/// Failures of the selection / normalization core.
///
/// File-level problems (unreadable file, bad JSON, unsupported extension) are
/// reported through `anyhow` by the loader; this enum only covers what can go
/// wrong once a [`ResultSet`](super::model::ResultSet) is in memory.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WakeError {
    #[error("quantity '{0}' not found in result set")]
    MissingKey(String),

    #[error("quantity '{key}' is not {expected}")]
    WrongShape { key: String, expected: &'static str },

    #[error("'{key}' has {len} samples but its axis '{axis}' has {axis_len}")]
    LengthMismatch {
        key: String,
        len: usize,
        axis: String,
        axis_len: usize,
    },

    #[error("reference data has no '{key}' for the {variant} case")]
    MissingVariant { variant: String, key: String },

    #[error("peak of '{0}' is zero, cannot normalize against it")]
    DivisionByZero(String),

    #[error("'{0}' has no elements")]
    EmptySequence(String),

    #[error("peak of '{0}' is not a finite number")]
    NonFinitePeak(String),
}

pub type WakeResult<T> = Result<T, WakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_key() {
        let err = WakeError::MissingKey("WPx".into());
        assert_eq!(err.to_string(), "quantity 'WPx' not found in result set");
    }

    #[test]
    fn display_missing_variant() {
        let err = WakeError::MissingVariant {
            variant: "dipolar-X".into(),
            key: "WPx_dipolarX_cst".into(),
        };
        assert_eq!(
            err.to_string(),
            "reference data has no 'WPx_dipolarX_cst' for the dipolar-X case"
        );
    }

    #[test]
    fn display_non_finite_peak() {
        let err = WakeError::NonFinitePeak("Zx_cst".into());
        assert_eq!(err.to_string(), "peak of 'Zx_cst' is not a finite number");
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = WakeError::EmptySequence("Z".into()).into();
        assert_eq!(format!("{err:#}"), "'Z' has no elements");
    }
}
