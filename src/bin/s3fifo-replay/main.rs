//! Synthetic-workload replay driver for the weighted S3-FIFO policy.
//!
//! Replays a seeded, skewed request stream through the policy one request
//! at a time and reports hit ratios and tier movement.

mod config;
mod logging;
mod metrics;
mod workload;

use crate::config::Config;
use crate::workload::Workload;

use clap::Parser;
use metriken::{AtomicHistogram, histogram::Histogram};
use std::path::PathBuf;
use weighted_s3fifo::{BoundedTier, PolicyConfig, TierId, WeightedS3Fifo};

/// Capacity used by `--print-config` when no config file is given.
const DEFAULT_CAPACITY: u64 = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "s3fifo-replay")]
#[command(about = "Replay a synthetic workload through the weighted S3-FIFO policy")]
struct Args {
    /// Path to configuration file
    config: Option<PathBuf>,

    /// Print the effective policy parameters and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("Failed to load config: {e}");
                std::process::exit(1);
            }
        },
        None => None,
    };

    if args.print_config {
        let (capacity, params) = config
            .as_ref()
            .map(|c| (c.cache.capacity, c.cache.params.as_str()))
            .unwrap_or((DEFAULT_CAPACITY, ""));
        match WeightedS3Fifo::from_params(capacity, params) {
            Ok(policy) => println!("{}", policy.current_params()),
            Err(e) => {
                eprintln!("Invalid policy parameters: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(config) = config else {
        eprintln!("No config file specified. Use s3fifo-replay <path> or --print-config");
        std::process::exit(1);
    };

    logging::init(&config.logging);

    if let Err(e) = run(config) {
        tracing::error!(error = %e, "replay failed");
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = PolicyConfig::from_params(&config.cache.params)?;
    let mut policy = WeightedS3Fifo::new(config.cache.capacity, parsed.config)?;

    if parsed.print_requested {
        println!("{}", policy.current_params());
        return Ok(());
    }

    print_config(&config, &policy);

    let mut workload = Workload::new(&config.workload, config.general.seed);
    let interval = config.general.report_interval;
    let mut last_hits = 0u64;
    let mut last_requests = 0u64;

    if interval > 0 {
        print_header();
    }

    for n in 1..=config.general.requests {
        let request = workload.next_request();

        metrics::REQUESTS.increment();
        metrics::BYTES_REQUESTED.add(request.size);
        let _ = metrics::OBJECT_SIZE.increment(request.size);

        if policy.get(&request)? {
            metrics::HITS.increment();
        } else {
            metrics::MISSES.increment();
            metrics::BYTES_MISSED.add(request.size);
            if policy.peek(request.id).is_none() {
                metrics::REJECTED.increment();
            }
        }

        if interval > 0 && n % interval == 0 {
            let hits = metrics::HITS.value();
            let requests = metrics::REQUESTS.value();
            let interval_hit_pct = percent(hits - last_hits, requests - last_requests);
            last_hits = hits;
            last_requests = requests;

            let ratios = policy.ratios();
            println!(
                "{:>12} {:>7.2}% {:>7.2}% {:>10} {:>12} {:>6.3} {:>6.3} {:>6.3}",
                n,
                percent(hits, requests),
                interval_hit_pct,
                policy.object_count(),
                policy.occupied_bytes(),
                ratios.small,
                ratios.main,
                ratios.large,
            );
        }
    }

    print_summary(&policy);

    Ok(())
}

fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

fn print_config(config: &Config, policy: &WeightedS3Fifo) {
    let budgets = policy.budgets();
    eprintln!("s3fifo-replay configuration:");
    eprintln!("  policy:     {}", policy.name());
    eprintln!("  params:     {}", policy.current_params());
    eprintln!("  capacity:   {} bytes", config.cache.capacity);
    eprintln!(
        "  budgets:    small={} main={} large={}",
        budgets.small, budgets.main, budgets.large,
    );
    eprintln!("  requests:   {}", config.general.requests);
    eprintln!("  seed:       {}", config.general.seed);
    eprintln!(
        "  keyspace:   {} keys, skew {}, {:.1}% large",
        config.workload.keys,
        config.workload.skew,
        config.workload.large_fraction * 100.0,
    );
    eprintln!(
        "  sizes:      small {}-{} bytes, large {}-{} bytes",
        config.workload.small_size.min,
        config.workload.small_size.max,
        config.workload.large_size.min,
        config.workload.large_size.max,
    );
    eprintln!();
}

fn print_header() {
    println!(
        "{:>12} {:>8} {:>8} {:>10} {:>12} {:>6} {:>6} {:>6}",
        "requests", "hit%", "int%", "objects", "bytes", "small", "main", "large",
    );
    println!("{}", "-".repeat(78));
}

fn print_summary(policy: &WeightedS3Fifo) {
    let requests = metrics::REQUESTS.value();
    let hits = metrics::HITS.value();
    let misses = metrics::MISSES.value();
    let rejected = metrics::REJECTED.value();
    let bytes_requested = metrics::BYTES_REQUESTED.value();
    let bytes_missed = metrics::BYTES_MISSED.value();
    let stats = policy.metrics();

    eprintln!();
    eprintln!("=== Final Summary ===");
    eprintln!("  requests:       {requests}");
    eprintln!("  hits:           {hits}");
    eprintln!("  misses:         {misses} (rejected: {rejected})");
    eprintln!("  hit rate:       {:.2}%", percent(hits, requests));
    eprintln!(
        "  byte miss rate: {:.2}%",
        percent(bytes_missed, bytes_requested)
    );
    eprintln!();
    eprintln!(
        "  admitted:       small={} large={} main={} (ghost {:.1}%)",
        stats.n_obj_admit_to_small,
        stats.n_obj_admit_to_large,
        stats.n_obj_admit_to_main,
        stats.ghost_admission_ratio() * 100.0,
    );
    eprintln!(
        "  promoted:       {} objects, {} bytes",
        stats.n_obj_move_to_main, stats.n_byte_move_to_main,
    );
    eprintln!(
        "  main:           {} retained, {} forced demotions",
        stats.main_retained, stats.main_forced_demotions,
    );
    eprintln!(
        "  ghost:          {} hits, {} demotions",
        stats.ghost_hits, stats.demoted_to_ghost,
    );
    eprintln!("  planner:        {} adjustments", stats.planner_adjustments);
    for tier in TierId::ALL {
        let t = policy.tier(tier);
        eprintln!(
            "  {:<6}          {} objects, {} bytes",
            format!("{tier}:"),
            t.len(),
            t.occupied_bytes(),
        );
    }
    eprintln!();

    let p50 = percentile(&metrics::OBJECT_SIZE, 50.0);
    let p99 = percentile(&metrics::OBJECT_SIZE, 99.0);
    let max = percentile(&metrics::OBJECT_SIZE, 100.0);
    eprintln!("  object size (bytes): p50={p50:.0}  p99={p99:.0}  max={max:.0}");
}

// --- Histogram helpers ---

fn percentile(hist: &AtomicHistogram, p: f64) -> f64 {
    if let Some(snapshot) = hist.load() {
        percentile_from_histogram(&snapshot, p)
    } else {
        0.0
    }
}

fn percentile_from_histogram(hist: &Histogram, p: f64) -> f64 {
    if let Ok(Some(results)) = hist.percentiles(&[p])
        && let Some((_pct, bucket)) = results.first()
    {
        return bucket.end() as f64;
    }
    0.0
}
