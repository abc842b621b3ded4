//! Writes a synthetic repository dataset for working without network access.
//!
//! `cargo run --bin generate_sample -- --rows 2000 --output repos.parquet`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Languages with rough relative popularity; `""` stands for "unknown".
const LANGUAGES: [(&str, u32); 12] = [
    ("JavaScript", 18),
    ("Python", 16),
    ("Java", 10),
    ("TypeScript", 9),
    ("Go", 7),
    ("C++", 7),
    ("Rust", 5),
    ("C", 5),
    ("Ruby", 4),
    ("PHP", 4),
    ("Kotlin", 3),
    ("", 12),
];

const OWNERS: [&str; 8] = ["acme", "octo", "nebula", "ferris", "orbit", "lumen", "quartz", "delta"];

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic GitHub repository dataset")]
struct Args {
    /// Number of repositories
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output file; .csv or .parquet
    #[arg(long, default_value = "github_dataset.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct Row {
    repositories: String,
    stars_count: i64,
    forks_count: i64,
    issues_count: i64,
    pull_requests: i64,
    contributors: i64,
    language: String,
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Heavy-tailed counts, like stars on GitHub.
    fn log_normal(&mut self, mu: f64, sigma: f64) -> i64 {
        self.gauss(mu, sigma).exp().round() as i64
    }

    fn pick_language(&mut self) -> &'static str {
        let total: u32 = LANGUAGES.iter().map(|(_, w)| w).sum();
        let mut target = (self.next_f64() * f64::from(total)) as u32;
        for (lang, weight) in LANGUAGES {
            if target < weight {
                return lang;
            }
            target -= weight;
        }
        ""
    }
}

fn generate(rows: usize, seed: u64) -> Vec<Row> {
    let mut rng = SimpleRng::new(seed);
    (0..rows)
        .map(|i| {
            let owner = OWNERS[(rng.next_u64() % OWNERS.len() as u64) as usize];
            let stars = rng.log_normal(4.0, 2.0);
            let fork_ratio = 0.05 + rng.next_f64() * 0.35;
            let contributors = 1 + rng.log_normal(1.5 + (stars as f64 + 1.0).ln() * 0.3, 0.8);
            Row {
                repositories: format!("{owner}/project-{i:05}"),
                stars_count: stars,
                forks_count: (stars as f64 * fork_ratio).round() as i64,
                issues_count: rng.log_normal((stars as f64 + 1.0).ln() * 0.5, 1.0),
                pull_requests: rng.log_normal(contributors as f64 / 10.0 + 0.5, 0.9),
                contributors,
                language: rng.pick_language().to_string(),
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let ints = |f: fn(&Row) -> i64| -> ArrayRef { Arc::new(Int64Array::from_iter_values(rows.iter().map(f))) };
    let names = StringArray::from_iter_values(rows.iter().map(|r| r.repositories.as_str()));
    let languages: StringArray = rows
        .iter()
        .map(|r| (!r.language.is_empty()).then_some(r.language.as_str()))
        .collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("repositories", DataType::Utf8, false),
        Field::new("stars_count", DataType::Int64, false),
        Field::new("forks_count", DataType::Int64, false),
        Field::new("issues_count", DataType::Int64, false),
        Field::new("pull_requests", DataType::Int64, false),
        Field::new("contributors", DataType::Int64, false),
        Field::new("language", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(names),
            ints(|r| r.stars_count),
            ints(|r| r.forks_count),
            ints(|r| r.issues_count),
            ints(|r| r.pull_requests),
            ints(|r| r.contributors),
            Arc::new(languages),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(args.rows, args.seed);

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

    println!("Wrote {} repositories to {}", rows.len(), args.output.display());
    Ok(())
}
