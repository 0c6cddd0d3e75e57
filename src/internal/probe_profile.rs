//! Measures how long lookups in `OpenAddressingSet` probe, for freshly built tables and for
//! tables that went through insert/remove churn, and plots both.
//!
//! Churn keeps the live size constant, so the table never grows and never reclaims its
//! tombstones. Misses in a churned table get longer as empty slots run out.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::indexing_slicing)]

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use plotters::prelude::*;
use probeset::{OpenAddressingSet, TableStats};
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Labels of the four measured series, in the order of `Measurement::series`
const SERIES: [&str; 4] = ["fresh, hit", "fresh, miss", "churned, hit", "churned, miss"];

/// Lookups sampled for the miss series
const MISS_SAMPLES: usize = 1_000;

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "probe_profile", about = "Plot probe lengths of the open-addressing set")]
struct Args {
    /// Largest live size measured
    #[arg(long, default_value_t = 4096)]
    keys: usize,
    /// Number of live sizes measured between `keys / points` and `keys`
    #[arg(long, default_value_t = 12)]
    points: usize,
    /// Remove/insert rounds in the churn workload, as a multiple of the live size
    #[arg(long, default_value_t = 4)]
    cycles: usize,
    /// Seed of the key generator
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Where to write the chart
    #[arg(long, default_value = "probe_lengths.png")]
    output: PathBuf,
}

/// Results for one live size
#[derive(Debug, Clone, Copy)]
struct Measurement {
    /// Live keys in both tables
    live: usize,
    /// Average probes of a successful lookup, fresh table
    fresh_hit: f64,
    /// Average probes of an unsuccessful lookup, fresh table
    fresh_miss: f64,
    /// Average probes of a successful lookup, churned table
    churned_hit: f64,
    /// Average probes of an unsuccessful lookup, churned table
    churned_miss: f64,
    /// Occupancy of the churned table
    churned: TableStats,
}

impl Measurement {
    /// Values in the order of `SERIES`
    fn series(&self) -> [f64; 4] {
        [self.fresh_hit, self.fresh_miss, self.churned_hit, self.churned_miss]
    }
}

/// Average number of slots inspected when looking up each of `keys`
fn average_probe_len(set: &OpenAddressingSet<u64>, keys: &[u64]) -> f64 {
    if keys.is_empty() {
        return 0.0;
    }
    let total: usize = keys.iter().map(|key| set.probe_len(key)).sum();
    total as f64 / keys.len() as f64
}

/// Inserts random keys until one is accepted, returning it
fn insert_random(set: &mut OpenAddressingSet<u64>, rng: &mut StdRng) -> anyhow::Result<u64> {
    loop {
        let key: u64 = rng.random();
        match set.insert(key) {
            Ok(_) => return Ok(key),
            Err(err) if err.is_duplicate() => {}
            Err(err) => return Err(err).context("insert failed while building the table"),
        }
    }
}

/// Random keys absent from `set`
fn absent_keys(set: &OpenAddressingSet<u64>, rng: &mut StdRng) -> Vec<u64> {
    let mut keys = Vec::with_capacity(MISS_SAMPLES);
    while keys.len() < MISS_SAMPLES {
        let key: u64 = rng.random();
        if !set.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Builds a table of `live` keys, measures it, churns a copy and measures that
fn measure(live: usize, cycles: usize, rng: &mut StdRng) -> anyhow::Result<Measurement> {
    let mut set = OpenAddressingSet::new();
    let mut members = Vec::with_capacity(live);
    for _ in 0..live {
        members.push(insert_random(&mut set, rng)?);
    }

    let fresh_hit = average_probe_len(&set, &members);
    let fresh_miss = average_probe_len(&set, &absent_keys(&set, rng));

    let mut churned = set.clone();
    for _ in 0..live.saturating_mul(cycles) {
        if members.is_empty() {
            break;
        }
        let victim = members.swap_remove(rng.random_range(0..members.len()));
        churned.remove(&victim).context("churn removed a key that was not live")?;
        members.push(insert_random(&mut churned, rng)?);
    }

    let churned_hit = average_probe_len(&churned, &members);
    let churned_miss = average_probe_len(&churned, &absent_keys(&churned, rng));

    Ok(Measurement {
        live,
        fresh_hit,
        fresh_miss,
        churned_hit,
        churned_miss,
        churned: churned.stats(),
    })
}

/// Renders the measured series as a line chart
fn plot(path: &Path, rows: &[Measurement]) -> Result<(), Box<dyn std::error::Error>> {
    let font_family = "sans-serif";
    let colors = [
        RGBColor(50, 90, 220),  // Bright blue
        RGBColor(50, 180, 50),  // Bright green
        RGBColor(220, 50, 50),  // Bright red
        RGBColor(180, 50, 180), // Bright magenta
    ];

    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_x = rows.iter().map(|row| row.live).max().unwrap_or(1) as f64;
    let max_y = rows
        .iter()
        .flat_map(Measurement::series)
        .fold(2.0, |max: f64, y| max.max(y)) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Probe length: fresh tables vs. tombstone churn", (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..max_x, (1f64..max_y).log_scale())?;

    chart
        .configure_mesh()
        .x_desc("Live keys")
        .y_desc("Average probes per lookup")
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (series_idx, label) in SERIES.iter().enumerate() {
        let color = colors[series_idx % colors.len()];
        let line_style = ShapeStyle::from(&color).stroke_width(2);
        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|row| row.series().get(series_idx).map(|&y| (row.live as f64, y)))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), line_style))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));
        chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let points = args.points.max(1);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut rows = Vec::with_capacity(points);
    for step in 1..=points {
        let live = (args.keys * step / points).max(1);
        let row = measure(live, args.cycles, &mut rng)?;
        info!(
            live,
            fresh_hit = row.fresh_hit,
            fresh_miss = row.fresh_miss,
            churned_hit = row.churned_hit,
            churned_miss = row.churned_miss,
            capacity = row.churned.capacity,
            tombstones = row.churned.tombstones,
            empty = row.churned.empty,
            "measured"
        );
        rows.push(row);
    }

    plot(&args.output, &rows)
        .map_err(|err| anyhow!("failed to render {}: {err}", args.output.display()))?;
    println!("Generated plot image: {}", args.output.display());
    Ok(())
}
