use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use wakeplot::data::model::{ResultSet, ResultValue};
use wakeplot::data::selector::{ComparisonVariant, TransverseQuantity};

const C_LIGHT: f64 = 299_792_458.0;

/// Single-mode resonator standing in for a real structure.
struct Resonator {
    /// Resonant frequency [Hz].
    fr: f64,
    /// Shunt impedance [Ω].
    r_shunt: f64,
    q: f64,
}

impl Resonator {
    fn impedance(&self, f: f64) -> f64 {
        if f <= 0.0 {
            return 0.0;
        }
        let detune = f / self.fr - self.fr / f;
        self.r_shunt / (1.0 + self.q.powi(2) * detune.powi(2))
    }

    /// Damped oscillation behind the source, `phase` = 0 for cosine-like
    /// (longitudinal) and π/2 for sine-like (transverse) wakes.
    fn wake(&self, s: f64, amplitude: f64, phase: f64) -> f64 {
        let k = 2.0 * PI * self.fr / C_LIGHT;
        let damping = k / (2.0 * self.q);
        amplitude * (-damping * s).exp() * (k * s - phase).cos()
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform noise in `[-level, level]`.
    fn jitter(&mut self, level: f64) -> f64 {
        (2.0 * self.next_f64() - 1.0) * level
    }
}

fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Offsets used for the synthetic solver run: source beam 1 mm off in x.
const SOURCE_X: f64 = 1e-3;

fn solver_results(model: &Resonator) -> ResultSet {
    let s = linspace(0.0, 0.5, 1000);
    let f = linspace(0.0, 5e9, 1000);

    let wp: Vec<f64> = s.iter().map(|&si| model.wake(si, 2.0, 0.0)).collect();
    let wpx: Vec<f64> = s.iter().map(|&si| model.wake(si, 0.8, PI / 2.0)).collect();
    let wpy: Vec<f64> = s.iter().map(|&si| model.wake(si, 0.02, PI / 2.0)).collect();
    let z: Vec<f64> = f.iter().map(|&fi| model.impedance(fi)).collect();
    let zx: Vec<f64> = z.iter().map(|zi| zi * 0.4).collect();
    let zy: Vec<f64> = z.iter().map(|zi| zi * 0.01).collect();

    ResultSet::from_pairs([
        ("s", ResultValue::Array(s)),
        ("f", ResultValue::Array(f)),
        ("WP", ResultValue::Array(wp)),
        ("WPx", ResultValue::Array(wpx)),
        ("WPy", ResultValue::Array(wpy)),
        ("Z", ResultValue::Array(z)),
        ("Zx", ResultValue::Array(zx)),
        ("Zy", ResultValue::Array(zy)),
        ("xsource", ResultValue::Scalar(SOURCE_X)),
        ("ysource", ResultValue::Scalar(0.0)),
        ("xtest", ResultValue::Scalar(0.0)),
        ("ytest", ResultValue::Scalar(0.0)),
    ])
}

/// Reference export: slightly detuned model on a coarser grid, one run per
/// offset case.
fn reference_results(model: &Resonator, rng: &mut SimpleRng) -> ResultSet {
    let s = linspace(0.0, 0.4, 400);
    let f = linspace(0.0, 4e9, 400);
    let mut values: BTreeMap<String, ResultValue> = BTreeMap::new();

    let noisy = |v: f64, rng: &mut SimpleRng| v + rng.jitter(1e-3 * v.abs().max(1e-3));
    let wp: Vec<f64> = s.iter().map(|&si| noisy(model.wake(si, 2.0, 0.0), rng)).collect();
    let z: Vec<f64> = f.iter().map(|&fi| noisy(model.impedance(fi), rng)).collect();
    values.insert("s_cst".into(), ResultValue::Array(s.clone()));
    values.insert("WP_cst".into(), ResultValue::Array(wp));
    values.insert("freq_cst".into(), ResultValue::Array(f.clone()));
    values.insert("Z_cst".into(), ResultValue::Array(z.clone()));

    for variant in ComparisonVariant::ALL {
        // Dipolar runs respond to the source offset, quadrupolar runs more weakly.
        let (gain_x, gain_y) = match variant {
            ComparisonVariant::OnAxis => (0.0, 0.0),
            ComparisonVariant::DipolarX => (0.8, 0.02),
            ComparisonVariant::DipolarY => (0.02, 0.8),
            ComparisonVariant::DipolarBoth => (0.8, 0.8),
            ComparisonVariant::QuadrupolarX => (0.3, -0.3),
            ComparisonVariant::QuadrupolarY => (-0.3, 0.3),
            ComparisonVariant::QuadrupolarBoth => (0.3, 0.3),
        };

        let [axis, x, y] = variant.reference_keys(TransverseQuantity::WakePotential);
        let wx: Vec<f64> = s
            .iter()
            .map(|&si| noisy(model.wake(si, gain_x, PI / 2.0), rng))
            .collect();
        let wy: Vec<f64> = s
            .iter()
            .map(|&si| noisy(model.wake(si, gain_y, PI / 2.0), rng))
            .collect();
        values.insert(axis, ResultValue::Array(s.clone()));
        values.insert(x, ResultValue::Array(wx));
        values.insert(y, ResultValue::Array(wy));

        let [axis, x, y] = variant.reference_keys(TransverseQuantity::Impedance);
        let zx: Vec<f64> = z.iter().map(|zi| zi * gain_x.abs() / 2.0).collect();
        let zy: Vec<f64> = z.iter().map(|zi| zi * gain_y.abs() / 2.0).collect();
        values.insert(axis, ResultValue::Array(f.clone()));
        values.insert(x, ResultValue::Array(zx));
        values.insert(y, ResultValue::Array(zy));
    }

    ResultSet::from_map(values)
}

/// One single-row Parquet file: list columns for arrays, plain columns for scalars.
fn write_parquet(results: &ResultSet, path: &str) {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for (key, value) in results.iter() {
        match value {
            ResultValue::Array(values) => {
                let mut builder = ListBuilder::new(Float64Builder::new());
                builder.values().append_slice(values);
                builder.append(true);
                let item = Arc::new(Field::new("item", DataType::Float64, true));
                fields.push(Field::new(key, DataType::List(item), false));
                columns.push(Arc::new(builder.finish()));
            }
            ResultValue::Scalar(v) => {
                fields.push(Field::new(key, DataType::Float64, false));
                columns.push(Arc::new(Float64Array::from(vec![*v])));
            }
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let solver_model = Resonator {
        fr: 2.0e9,
        r_shunt: 80.0,
        q: 40.0,
    };
    let reference_model = Resonator {
        fr: 2.02e9,
        r_shunt: 92.0,
        q: 40.0,
    };

    let solver = solver_results(&solver_model);
    let solver_path = "wake_solver.parquet";
    write_parquet(&solver, solver_path);

    let reference = reference_results(&reference_model, &mut rng);
    let reference_path = "cst_out.json";
    let json = serde_json::to_string(&reference).expect("Failed to serialize reference data");
    std::fs::write(reference_path, json).expect("Failed to write reference data");

    println!(
        "Wrote {} solver quantities to {solver_path} and {} reference quantities to {reference_path}",
        solver.len(),
        reference.len()
    );
}
