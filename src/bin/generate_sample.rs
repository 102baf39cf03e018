//! Writes a synthetic hotel booking dataset for trying out the dashboard.
//!
//! ```text
//! generate_sample sample_bookings.csv --rows 5000
//! generate_sample sample_bookings.parquet
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use hotel_dash::data::loader::REQUIRED_COLUMNS;
use hotel_dash::data::season::{Month, Season};

/// Generate a synthetic hotel booking dataset (CSV or Parquet)
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version, about)]
struct Args {
    /// Output file; the extension selects the format
    #[arg(default_value = "sample_bookings.csv")]
    output: PathBuf,

    /// Number of bookings to generate
    #[arg(long, default_value_t = 5000)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Index drawn with probability proportional to `weights`.
    fn weighted(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut pick = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if pick < *w {
                return i;
            }
            pick -= w;
        }
        weights.len() - 1
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Country code, booking share, base cancellation probability.
const COUNTRIES: [(&str, f64, f64); 10] = [
    ("PRT", 40.0, 0.55),
    ("GBR", 10.0, 0.20),
    ("FRA", 9.0, 0.18),
    ("ESP", 7.0, 0.25),
    ("DEU", 6.0, 0.17),
    ("ITA", 3.0, 0.35),
    ("IRL", 3.0, 0.25),
    ("BRA", 2.0, 0.37),
    ("USA", 2.0, 0.24),
    ("", 0.5, 0.10),
];

/// Relative arrival volume per calendar month.
const MONTH_WEIGHTS: [f64; 12] = [5.0, 6.5, 8.0, 9.0, 10.0, 9.0, 10.5, 11.5, 8.5, 9.5, 5.5, 5.5];

struct Row {
    is_canceled: i64,
    adults: i64,
    /// `None` is written as a missing cell.
    children: Option<f64>,
    babies: i64,
    adr: f64,
    month: Month,
    country: &'static str,
}

fn generate(rng: &mut SimpleRng, n: usize) -> Vec<Row> {
    let country_weights: Vec<f64> = COUNTRIES.iter().map(|c| c.1).collect();
    (0..n)
        .map(|_| {
            let month = Month::ALL[rng.weighted(&MONTH_WEIGHTS)];
            let (country, _, base_cancel) = COUNTRIES[rng.weighted(&country_weights)];

            let adults = [0, 1, 2, 3, 4][rng.weighted(&[0.4, 19.0, 75.0, 5.0, 0.6])];
            let children = [0.0, 1.0, 2.0, 3.0][rng.weighted(&[92.0, 4.5, 3.3, 0.2])];
            let babies = i64::from(rng.chance(0.008));

            let season_price = match month.season() {
                Season::Summer => 140.0,
                Season::Spring | Season::Fall => 95.0,
                Season::Winter => 70.0,
            };
            let adr = (rng.gauss(season_price, 40.0) + 12.0 * children).max(0.0);
            let adr = (adr * 100.0).round() / 100.0;

            let cancel_p = (base_cancel + (adr - 100.0) / 1000.0).clamp(0.02, 0.95);

            Row {
                is_canceled: i64::from(rng.chance(cancel_p)),
                adults,
                children: (!rng.chance(0.002)).then_some(children),
                babies,
                adr,
                month,
                country,
            }
        })
        .collect()
}

/// A handful of rows the cleaning step must remove.
fn invalid_rows() -> Vec<Row> {
    let row = |adults, children, babies, adr| Row {
        is_canceled: 1,
        adults,
        children: Some(children),
        babies,
        adr,
        month: Month::July,
        country: "PRT",
    };
    vec![
        row(0, 0.0, 0, 0.0),
        row(2, 0.0, 0, 5400.0),
        row(2, 0.0, 0, -6.38),
        row(40, 0.0, 0, 0.0),
        row(2, 10.0, 0, 133.0),
        row(2, 0.0, 9, 84.45),
    ]
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(REQUIRED_COLUMNS)?;
    for r in rows {
        writer.write_record([
            r.is_canceled.to_string(),
            r.adults.to_string(),
            r.children.map(|c| format!("{c:.1}")).unwrap_or_default(),
            r.babies.to_string(),
            r.adr.to_string(),
            r.month.name().to_string(),
            r.country.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let int_col = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        int_col(|r| r.is_canceled),
        int_col(|r| r.adults),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.children).collect::<Vec<_>>())),
        int_col(|r| r.babies),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.adr).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.month.name()).collect::<Vec<_>>())),
        Arc::new(StringArray::from(
            rows.iter()
                .map(|r| (!r.country.is_empty()).then_some(r.country))
                .collect::<Vec<_>>(),
        )),
    ];

    let types = [
        DataType::Int64,
        DataType::Int64,
        DataType::Float64,
        DataType::Int64,
        DataType::Float64,
        DataType::Utf8,
        DataType::Utf8,
    ];
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .zip(types)
        .map(|(name, ty)| Field::new(*name, ty, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let mut rows = generate(&mut rng, args.rows);
    rows.extend(invalid_rows());

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} bookings to {}", rows.len(), args.output.display());
    Ok(())
}
