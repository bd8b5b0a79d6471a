//! Benchmark quadsphere-cover merge at large scales.
//!
//! Run with: cargo run --release --bin bench_merge
//!
//! Usage:
//!   bench_merge                 Run default size (1m)
//!   bench_merge 100k 1m 10m     Run multiple sizes
//!   bench_merge -w 1,4,8        Compare worker counts
//!   bench_merge -n 10           Run 10 iterations (for profiling)

use clap::Parser;
use glam::DVec3;
use quadsphere_cover::{encode_point, merge, MergeOptions, SpatialId};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::{self, Write};
use std::time::Instant;

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if s.ends_with('m') {
        (&s[..s.len() - 1], 1_000_000)
    } else if s.ends_with('k') {
        (&s[..s.len() - 1], 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_merge")]
#[command(about = "Benchmark quadsphere-cover merge at various scales")]
struct Args {
    /// Identifier counts to benchmark (e.g., 100k, 1m, 10M)
    #[arg(value_parser = parse_count)]
    sizes: Vec<usize>,

    /// Random seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Resolution level of the generated identifiers
    #[arg(short, long, default_value_t = 12, value_parser = clap::value_parser!(u8).range(0..=27))]
    resolution: u8,

    /// Worker counts to compare
    #[arg(short, long, value_delimiter = ',', default_value = "1,4")]
    workers: Vec<usize>,

    /// Chunk count for the parallel dissolve (1 = one chunk per worker)
    #[arg(short, long, default_value_t = 1)]
    chunks: usize,

    /// Number of iterations to run (useful for profiling)
    #[arg(short = 'n', long, default_value_t = 1)]
    repeat: usize,
}

fn random_unit<R: Rng>(rng: &mut R) -> DVec3 {
    let z: f64 = rng.gen_range(-1.0..1.0);
    let theta: f64 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).sqrt();
    DVec3::new(r * theta.cos(), r * theta.sin(), z)
}

fn random_tangent<R: Rng>(p: DVec3, rng: &mut R) -> DVec3 {
    let arbitrary = if p.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    let u = p.cross(arbitrary).normalize();
    let v = p.cross(u);
    let angle: f64 = rng.gen_range(0.0..TAU);
    u * angle.cos() + v * angle.sin()
}

/// Clustered identifiers: many near-coincident points per cluster, so the
/// dissolve has real duplicate and sibling structure to collapse.
fn generate_sids(n: usize, resolution: u8, seed: u64) -> Vec<SpatialId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let num_clusters = (n / 64).clamp(1, 4096);
    let centers: Vec<DVec3> = (0..num_clusters).map(|_| random_unit(&mut rng)).collect();
    let cell_size = FRAC_PI_2 / (1u64 << resolution) as f64;

    (0..n)
        .map(|_| {
            let c = centers[rng.gen_range(0..num_clusters)];
            let spread: f64 = rng.gen_range(0.0..8.0 * cell_size);
            let p = (c + random_tangent(c, &mut rng) * spread).normalize();
            let lat = p.z.asin().to_degrees();
            let lon = p.y.atan2(p.x).to_degrees();
            encode_point(lat, lon, resolution).expect("resolution is validated by clap input")
        })
        .collect()
}

fn format_rate(count: usize, ms: f64) -> String {
    if ms <= 0.0 {
        return "N/A".to_string();
    }
    let per_sec = count as f64 / (ms / 1000.0);
    if per_sec >= 1_000_000.0 {
        format!("{:.2}M/s", per_sec / 1_000_000.0)
    } else if per_sec >= 1_000.0 {
        format!("{:.1}k/s", per_sec / 1000.0)
    } else {
        format!("{:.0}/s", per_sec)
    }
}

fn format_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{}k", n / 1_000)
    } else {
        format!("{}", n)
    }
}

struct BenchResult {
    n: usize,
    workers: usize,
    time_ms: f64,
    cover_len: usize,
}

fn run_merge(sids: &[SpatialId], workers: usize, chunks: usize) -> BenchResult {
    let opts = MergeOptions {
        workers,
        chunks,
        ..Default::default()
    };

    let t0 = Instant::now();
    let cover = merge(sids, &opts).expect("merge should succeed");
    let time_ms = t0.elapsed().as_secs_f64() * 1000.0;

    #[cfg(debug_assertions)]
    {
        use quadsphere_cover::validation::audit_cover;
        let report = audit_cover(&cover);
        if !report.is_clean_cover() {
            eprintln!(
                "WARNING: merge output failed audit for workers={}: {}",
                workers, report
            );
        }
    }

    BenchResult {
        n: sids.len(),
        workers,
        time_ms,
        cover_len: cover.len(),
    }
}

fn main() {
    let args = Args::parse();

    println!("quadsphere-cover merge benchmark");
    println!("================================\n");

    let sizes: Vec<usize> = if args.sizes.is_empty() {
        vec![1_000_000]
    } else {
        args.sizes
    };
    let workers: Vec<usize> = if args.workers.is_empty() {
        vec![1]
    } else {
        args.workers
    };

    println!("Configuration:");
    println!("  seed = {}", args.seed);
    println!("  resolution = {}", args.resolution);
    println!(
        "  sizes = {:?}",
        sizes.iter().map(|&n| format_num(n)).collect::<Vec<_>>()
    );
    println!("  workers = {:?}", workers);
    if args.chunks > 1 {
        println!("  chunks = {}", args.chunks);
    }
    if args.repeat > 1 {
        println!("  repeat = {}", args.repeat);
    }

    let mut results: Vec<BenchResult> = Vec::new();

    for n in &sizes {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking n = {}", format_num(*n));
        println!("{}", "=".repeat(60));

        let t_gen = Instant::now();
        let sids = generate_sids(*n, args.resolution, args.seed);
        let gen_time = t_gen.elapsed().as_secs_f64() * 1000.0;
        println!("Identifier generation: {:.1}ms", gen_time);

        for &w in &workers {
            let mut times: Vec<f64> = Vec::with_capacity(args.repeat);
            let mut last_result: Option<BenchResult> = None;

            for iter in 0..args.repeat {
                if args.repeat > 1 {
                    print!("  workers={} iteration {}/{}... ", w, iter + 1, args.repeat);
                    io::stdout().flush().unwrap();
                }

                let result = run_merge(&sids, w, args.chunks);
                times.push(result.time_ms);

                if args.repeat > 1 {
                    println!("{:.1}ms", result.time_ms);
                }

                last_result = Some(result);
            }

            let result = last_result.unwrap();

            println!("\nResults (workers = {}):", w);
            if args.repeat > 1 {
                let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
                let avg = times.iter().sum::<f64>() / times.len() as f64;
                println!("  Min time:      {:>8.1}ms", min);
                println!("  Avg time:      {:>8.1}ms", avg);
                println!("  Throughput:    {:>8} (avg)", format_rate(result.n, avg));
            } else {
                println!("  Total time:    {:>8.1}ms", result.time_ms);
                println!(
                    "  Throughput:    {:>8}",
                    format_rate(result.n, result.time_ms)
                );
            }
            println!("  Cover size:    {:>8}", format_num(result.cover_len));
            println!(
                "  Compression:   {:>8.2}x",
                result.n as f64 / result.cover_len.max(1) as f64
            );

            results.push(result);
        }
    }

    if results.len() > 1 {
        println!("\n\n{}", "=".repeat(60));
        println!("SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "{:>10} | {:>7} | {:>10} | {:>12} | {:>10}",
            "n", "workers", "time", "throughput", "cover"
        );
        println!(
            "{:-<10}-+-{:-<7}-+-{:-<10}-+-{:-<12}-+-{:-<10}",
            "", "", "", "", ""
        );

        for r in &results {
            println!(
                "{:>10} | {:>7} | {:>9.1}ms | {:>12} | {:>10}",
                format_num(r.n),
                r.workers,
                r.time_ms,
                format_rate(r.n, r.time_ms),
                format_num(r.cover_len)
            );
        }
    }

    println!("\nBenchmark complete.");
}
