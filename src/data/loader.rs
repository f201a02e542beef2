use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{ResultSet, ResultValue};

/// File stem written by the wake solver.
pub const SOLVER_STEM: &str = "wake_solver";
/// File stem of the reference-tool export.
pub const REFERENCE_STEM: &str = "cst_out";

/// Extensions tried by [`find_result_file`], in order.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["parquet", "pq", "json", "csv"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a result set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per quantity; a single-row list column is an
///   array, a flat numeric column is an array (or a scalar if it has one row)
/// * `.json`    – `{ "WP": [...], "xsource": 0.0, ... }`
/// * `.csv`     – one column per quantity, header row holds the keys
pub fn load_file(path: &Path) -> Result<ResultSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let results = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if results.is_empty() {
        log::warn!("{} holds no quantities", path.display());
    } else {
        log::info!("Loaded {} quantities from {}", results.len(), path.display());
    }
    Ok(results)
}

/// Locate `<stem>.<ext>` inside `dir`, trying [`SUPPORTED_EXTENSIONS`] in order.
pub fn find_result_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Resolve a user-supplied path: a file is used as-is, a directory is
/// searched for `<stem>.*`.
fn resolve(path: &Path, stem: &str) -> Option<PathBuf> {
    if path.is_dir() {
        find_result_file(path, stem)
    } else if path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

/// Load the solver output. A run that has not produced results yet is not an
/// error: `Ok(None)` is returned when no file is found.
pub fn load_solver_output(path: &Path) -> Result<Option<ResultSet>> {
    match resolve(path, SOLVER_STEM) {
        Some(file) => load_file(&file).map(Some),
        None => {
            log::warn!("No solver output found at {}", path.display());
            Ok(None)
        }
    }
}

/// Load the reference-tool export. Unlike the solver output it must exist.
pub fn load_reference_output(path: &Path) -> Result<ResultSet> {
    let file = resolve(path, REFERENCE_STEM)
        .with_context(|| format!("no reference data found at {}", path.display()))?;
    load_file(&file)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (a flat object, as written by `json.dump(dict)`):
///
/// ```json
/// {
///   "s":       [0.0, 1e-4, ...],
///   "WP":      [0.12, 0.14, ...],
///   "xsource": 0.0
/// }
/// ```
///
/// `null` entries inside arrays become NaN (that is how NaN round-trips
/// through JSON).
fn load_json(path: &Path) -> Result<ResultSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let obj = root
        .as_object()
        .context("Expected top-level JSON object")?;

    let mut values = BTreeMap::new();
    for (key, val) in obj {
        values.insert(key.clone(), json_to_value(key, val)?);
    }

    Ok(ResultSet::from_map(values))
}

fn json_to_value(key: &str, val: &JsonValue) -> Result<ResultValue> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .map(ResultValue::Scalar)
            .with_context(|| format!("'{key}': number out of range")),
        JsonValue::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(j, v)| match v {
                JsonValue::Null => Ok(f64::NAN),
                other => other
                    .as_f64()
                    .with_context(|| format!("'{key}'[{j}]: not a number")),
            })
            .collect::<Result<Vec<f64>>>()
            .map(ResultValue::Array),
        other => bail!("'{key}': expected a number or numeric array, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with quantity names, one column per quantity.
/// Columns may have different lengths; a column ends at its last non-empty
/// cell and empty cells before that are NaN. A column holding a single value
/// is read as a scalar.
fn load_csv(path: &Path) -> Result<ResultSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let cell = record.get(col_idx).unwrap_or("").trim();
            if cell.is_empty() {
                column.push(None);
                continue;
            }
            let value = cell.parse::<f64>().with_context(|| {
                format!(
                    "Row {row_no}, {}: '{cell}' is not a number",
                    headers[col_idx]
                )
            })?;
            column.push(Some(value));
        }
    }

    let mut values = BTreeMap::new();
    for (name, mut cells) in headers.into_iter().zip(columns) {
        while matches!(cells.last(), Some(None)) {
            cells.pop();
        }
        let data: Vec<f64> = cells.into_iter().map(|c| c.unwrap_or(f64::NAN)).collect();
        let value = match data.as_slice() {
            [single] => ResultValue::Scalar(*single),
            _ => ResultValue::Array(data),
        };
        values.insert(name, value);
    }

    Ok(ResultSet::from_map(values))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ColumnAccumulator {
    flat: Vec<f64>,
    lists: Vec<Vec<f64>>,
}

/// Load a Parquet file holding one quantity per column.
///
/// Expected schema:
/// - `List<Float64>` / `LargeList<Float64>` with exactly one row – an array
/// - Float64 / Float32 / Int64 / Int32 – the column itself is the array;
///   a single row makes it a scalar
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ResultSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: BTreeMap<String, ColumnAccumulator> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let col = batch.column(col_idx);
            let acc = columns.entry(field.name().clone()).or_default();
            match col.data_type() {
                DataType::List(_) | DataType::LargeList(_) => {
                    for row in 0..batch.num_rows() {
                        let list = extract_f64_list(col, row).with_context(|| {
                            format!("Row {row}: failed to read '{}'", field.name())
                        })?;
                        acc.lists.push(list);
                    }
                }
                _ => {
                    let flat = extract_f64_column(col)
                        .with_context(|| format!("failed to read '{}'", field.name()))?;
                    acc.flat.extend(flat);
                }
            }
        }
    }

    let mut values = BTreeMap::new();
    for (name, acc) in columns {
        let value = if !acc.lists.is_empty() {
            let mut lists = acc.lists;
            if lists.len() != 1 {
                bail!("'{name}': expected one list row, found {}", lists.len());
            }
            ResultValue::Array(lists.remove(0))
        } else if acc.flat.len() == 1 {
            ResultValue::Scalar(acc.flat[0])
        } else {
            ResultValue::Array(acc.flat)
        };
        values.insert(name, value);
    }

    Ok(ResultSet::from_map(values))
}

// -- Parquet / Arrow helpers --

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    extract_f64_column(&values_array)
}

/// Read a flat numeric column as `f64`, nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!(
            "column type is {:?}, expected a numeric type",
            col.data_type()
        )
    }
}
