use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{WakeError, WakeResult};

// ---------------------------------------------------------------------------
// ResultValue – a single named quantity
// ---------------------------------------------------------------------------

/// One stored quantity: either a bare number (beam offsets, charge, ...) or a
/// sampled sequence (wake potential, impedance, axes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Scalar(v) => write!(f, "{v:.4e}"),
            ResultValue::Array(a) => write!(f, "[{} values]", a.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultSet – the complete loaded mapping
// ---------------------------------------------------------------------------

/// Named quantities produced by the wake solver or imported from the
/// reference tool. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    values: BTreeMap<String, ResultValue>,
}

impl ResultSet {
    pub fn from_map(values: BTreeMap<String, ResultValue>) -> Self {
        Self { values }
    }

    /// Build from `(key, value)` pairs; later duplicates win.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ResultValue)>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Sampled sequence stored under `key`. A scalar reads as a one-sample
    /// sequence, the shape loaders give a column with a single value.
    pub fn array(&self, key: &str) -> WakeResult<&[f64]> {
        match self.values.get(key) {
            Some(ResultValue::Array(a)) => Ok(a),
            Some(ResultValue::Scalar(v)) => Ok(std::slice::from_ref(v)),
            None => Err(WakeError::MissingKey(key.to_string())),
        }
    }

    /// Scalar stored under `key`. A one-element array is accepted, since
    /// exporters frequently wrap scalars that way.
    pub fn scalar(&self, key: &str) -> WakeResult<f64> {
        match self.values.get(key) {
            Some(ResultValue::Scalar(v)) => Ok(*v),
            Some(ResultValue::Array(a)) if a.len() == 1 => Ok(a[0]),
            Some(ResultValue::Array(_)) => Err(WakeError::WrongShape {
                key: key.to_string(),
                expected: "a scalar",
            }),
            None => Err(WakeError::MissingKey(key.to_string())),
        }
    }

    /// Source and test beam offsets recorded by the solver.
    pub fn beam_offsets(&self) -> WakeResult<BeamOffsetConfig> {
        Ok(BeamOffsetConfig {
            source_x: self.scalar("xsource")?,
            source_y: self.scalar("ysource")?,
            test_x: self.scalar("xtest")?,
            test_y: self.scalar("ytest")?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// BeamOffsetConfig
// ---------------------------------------------------------------------------

/// Transverse offsets of the source (driving) and test (witness) beams, in
/// metres. Only ever compared against exact zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamOffsetConfig {
    pub source_x: f64,
    pub source_y: f64,
    pub test_x: f64,
    pub test_y: f64,
}

impl BeamOffsetConfig {
    pub fn on_axis() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet::from_pairs([
            ("s", ResultValue::Array(vec![0.0, 1e-3, 2e-3])),
            ("xsource", ResultValue::Scalar(1e-3)),
            ("ysource", ResultValue::Array(vec![0.0])),
            ("xtest", ResultValue::Scalar(0.0)),
            ("ytest", ResultValue::Scalar(0.0)),
        ])
    }

    #[test]
    fn array_and_scalar_lookup() {
        let rs = sample();
        assert_eq!(rs.array("s").unwrap().len(), 3);
        assert_eq!(rs.scalar("xsource").unwrap(), 1e-3);
        assert_eq!(rs.scalar("ysource").unwrap(), 0.0);
    }

    #[test]
    fn missing_and_misshaped_keys() {
        let rs = sample();
        assert_eq!(rs.array("WP"), Err(WakeError::MissingKey("WP".into())));
        assert!(matches!(rs.scalar("s"), Err(WakeError::WrongShape { .. })));
    }

    #[test]
    fn scalar_reads_as_one_sample_sequence() {
        let rs = sample();
        assert_eq!(rs.array("xsource").unwrap(), &[1e-3]);
        assert_eq!(rs.array("ysource").unwrap(), &[0.0]);
        assert!(!rs.is_empty());
        assert!(ResultSet::default().is_empty());
    }

    #[test]
    fn beam_offsets_are_read_from_solver_keys() {
        let offsets = sample().beam_offsets().unwrap();
        assert_eq!(
            offsets,
            BeamOffsetConfig {
                source_x: 1e-3,
                ..BeamOffsetConfig::on_axis()
            }
        );
    }

    #[test]
    fn deserializes_from_flat_json_object() {
        let rs: ResultSet =
            serde_json::from_str(r#"{"WP": [0.0, 1.5], "xtest": 0.002}"#).unwrap();
        assert_eq!(rs.array("WP").unwrap(), &[0.0, 1.5]);
        assert_eq!(rs.scalar("xtest").unwrap(), 0.002);
    }
}
