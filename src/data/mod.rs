/// Data layer: core types, loading, reference selection and scaling.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ResultSet
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ ResultSet  │  quantity name → scalar | array
///   └───────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌───────────┐
///   │ selector  │   │ normalize  │  beam offsets → reference run,
///   └──────────┘   └───────────┘  peak ratio → display factor
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod selector;
