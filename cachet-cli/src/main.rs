mod catalog;

use anyhow::{Context, Result};
use cachet_core::{
    CacheEngine, CacheError, DataSource, EngineConfig, LoggingConfig, MemoryStore, Outcome,
    Scalar, StatsSnapshot, Strategy, metrics,
};
use catalog::PhotoCatalog;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cachet-cli")]
#[command(about = "Cachet CLI - replay photo catalog traffic through a caching strategy", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level, overrides the configuration file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available strategies
    Strategies,

    /// Replay traffic through one strategy
    Run {
        /// Strategy to use (defaults to the configured one)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        #[command(flatten)]
        workload: Workload,

        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Replay the same traffic through every strategy
    Compare {
        #[command(flatten)]
        workload: Workload,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct Workload {
    /// Total number of requests
    #[arg(short = 'n', long, default_value = "1000")]
    requests: u64,

    /// Concurrent workers
    #[arg(short = 'j', long, default_value = "8")]
    concurrency: u64,

    /// Number of photos in the catalog
    #[arg(long, default_value = "100")]
    photos: i64,

    /// Simulated database latency in milliseconds
    #[arg(long, default_value = "20")]
    latency_ms: u64,

    /// Every Nth request likes a photo (0 disables writes)
    #[arg(long, default_value = "10")]
    write_every: u64,
}

impl Workload {
    /// Deterministic skew: 80% of reads go to the hottest fifth of the catalog
    fn photo_for(&self, request: u64) -> i64 {
        let photos = self.photos.max(1) as u64;
        let hot = (photos / 5).max(1);
        let id = if request % 10 < 8 {
            request.wrapping_mul(7) % hot
        } else {
            request.wrapping_mul(13) % photos
        };
        id as i64 + 1
    }

    fn is_write(&self, request: u64) -> bool {
        self.write_every > 0 && request % self.write_every == self.write_every - 1
    }
}

#[derive(Debug, Default)]
struct RunReport {
    strategy: Option<Strategy>,
    elapsed: Duration,
    served: u64,
    pending: u64,
    accepted: u64,
    not_found: u64,
    errors: u64,
    total_latency: Duration,
    source_reads: u64,
    source_writes: u64,
    stats: StatsSnapshot,
}

impl RunReport {
    fn merge(&mut self, other: &WorkerTally) {
        self.served += other.served;
        self.pending += other.pending;
        self.accepted += other.accepted;
        self.not_found += other.not_found;
        self.errors += other.errors;
        self.total_latency += other.latency;
    }

    fn mean_latency(&self) -> Duration {
        let total = self.served + self.pending + self.accepted + self.not_found + self.errors;
        if total == 0 {
            Duration::ZERO
        } else {
            self.total_latency / total as u32
        }
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    served: u64,
    pending: u64,
    accepted: u64,
    not_found: u64,
    errors: u64,
    latency: Duration,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.is_json() {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => {
            let mut config = EngineConfig::default();
            config.logging.level = "warn".to_string();
            config.logging.format = "pretty".to_string();
            config
        }
    };
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn build_engine(config: &EngineConfig, workload: &Workload) -> Result<(CacheEngine, Arc<PhotoCatalog>)> {
    let store = Arc::new(MemoryStore::new(config.to_store_config()));
    store.start_ttl_cleanup();

    let catalog = Arc::new(PhotoCatalog::new(
        workload.photos,
        Duration::from_millis(workload.latency_ms),
    ));
    let engine = CacheEngine::from_config(config, store, catalog.clone())
        .context("invalid engine configuration")?;
    Ok((engine, catalog))
}

async fn run_worker(
    engine: Arc<CacheEngine>,
    catalog: Arc<PhotoCatalog>,
    workload: Workload,
    strategy: Strategy,
    worker: u64,
) -> WorkerTally {
    let mut tally = WorkerTally::default();
    let supports_writes = matches!(
        strategy,
        Strategy::Baseline | Strategy::WriteThrough | Strategy::WriteBehind
    );

    let mut request = worker;
    while request < workload.requests {
        let id = workload.photo_for(request);
        let args = [Scalar::from(id)];
        let start = Instant::now();

        let result = if workload.is_write(request) {
            if supports_writes {
                engine.invoke_mutation(strategy, "likePhoto", &args).await
            } else {
                // Read-path strategies: write to the catalog, then drop the cached detail
                match catalog.mutate("likePhoto", &args).await {
                    Ok(liked) => engine
                        .invalidate(&format!("photoDetail:{}", id))
                        .await
                        .map(|_| Outcome::Value(liked)),
                    Err(e) => Err(CacheError::from(e)),
                }
            }
        } else {
            engine.invoke(strategy, "photoDetail", &args).await
        };
        tally.latency += start.elapsed();

        match result {
            Ok(Outcome::Value(_)) => tally.served += 1,
            Ok(Outcome::Pending { .. }) => tally.pending += 1,
            Ok(Outcome::Accepted(_)) => tally.accepted += 1,
            Ok(Outcome::NotFound) => tally.not_found += 1,
            Err(e) => {
                warn!("Request {} failed: {}", request, e);
                tally.errors += 1;
            }
        }

        request += workload.concurrency;
    }

    tally
}

async fn run_workload(
    engine: Arc<CacheEngine>,
    catalog: &Arc<PhotoCatalog>,
    workload: &Workload,
    strategy: Strategy,
) -> Result<RunReport> {
    engine.switch_strategy(strategy).await?;
    engine.reset_stats();
    let reads_before = catalog.reads();
    let writes_before = catalog.writes();

    info!(
        "Replaying {} requests through {} with {} workers",
        workload.requests, strategy, workload.concurrency
    );

    let start = Instant::now();
    let handles: Vec<_> = (0..workload.concurrency.max(1))
        .map(|worker| {
            tokio::spawn(run_worker(
                Arc::clone(&engine),
                Arc::clone(catalog),
                Workload {
                    concurrency: workload.concurrency.max(1),
                    ..workload.clone()
                },
                strategy,
                worker,
            ))
        })
        .collect();

    let mut report = RunReport {
        strategy: Some(strategy),
        ..Default::default()
    };
    for handle in handles {
        let tally = handle.await.context("worker task panicked")?;
        report.merge(&tally);
    }
    report.elapsed = start.elapsed();
    report.source_reads = catalog.reads() - reads_before;
    report.source_writes = catalog.writes() - writes_before;
    report.stats = engine.stats();

    Ok(report)
}

fn print_strategies() {
    println!("{}", "Strategies".bold());
    for strategy in Strategy::ALL {
        println!(
            "  {:<14} {}",
            strategy.as_str().cyan(),
            strategy.description()
        );
    }
}

fn print_report(report: &RunReport) {
    let name = report
        .strategy
        .map(|s| s.as_str())
        .unwrap_or("unknown");
    println!("{} {}", "Strategy:".bold(), name.cyan());
    println!(
        "  elapsed        {:.2?} (mean {:.2?} per request)",
        report.elapsed,
        report.mean_latency()
    );
    println!(
        "  outcomes       {} served, {} pending, {} accepted, {} not found, {}",
        report.served,
        report.pending,
        report.accepted,
        report.not_found,
        if report.errors == 0 {
            "0 errors".green()
        } else {
            format!("{} errors", report.errors).red()
        }
    );
    println!(
        "  source calls   {} reads, {} writes",
        report.source_reads, report.source_writes
    );
    println!(
        "  cache          {} hits, {} misses, {} sets, {} deletes, hit rate {}",
        report.stats.hits,
        report.stats.misses,
        report.stats.sets,
        report.stats.deletes,
        format!("{:.1}%", report.stats.hit_rate * 100.0).yellow()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.logging);
    metrics::init();

    info!("Starting Cachet CLI v{}", env!("CARGO_PKG_VERSION"));

    match &args.command {
        Command::Strategies => print_strategies(),

        Command::Run {
            strategy,
            workload,
            metrics: show_metrics,
        } => {
            let (engine, catalog) = build_engine(&config, workload)?;
            let engine = Arc::new(engine);
            let strategy = strategy.unwrap_or_else(|| engine.current_strategy());

            let report = run_workload(Arc::clone(&engine), &catalog, workload, strategy).await?;
            print_report(&report);

            let store_stats = engine.store_stats().await?;
            println!(
                "  store          {} keys, {} bytes, hit rate {:.1}%",
                store_stats.total_keys,
                store_stats.total_memory_bytes,
                store_stats.hit_rate() * 100.0
            );

            if *show_metrics {
                let text = metrics::encode_metrics()
                    .map_err(|e| anyhow::anyhow!("failed to encode metrics: {}", e))?;
                println!("\n{}", text);
            }

            engine.shutdown().await?;
        }

        Command::Compare { workload } => {
            let (engine, catalog) = build_engine(&config, workload)?;
            let engine = Arc::new(engine);

            for strategy in Strategy::ALL {
                let report =
                    run_workload(Arc::clone(&engine), &catalog, workload, strategy).await?;
                print_report(&report);
                println!();
            }

            engine.shutdown().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload() -> Workload {
        Workload {
            requests: 200,
            concurrency: 4,
            photos: 50,
            latency_ms: 0,
            write_every: 10,
        }
    }

    #[test]
    fn test_photo_skew_stays_in_range() {
        let workload = workload();
        let hot = (0..1000)
            .map(|i| workload.photo_for(i))
            .inspect(|id| assert!((1..=50).contains(id)))
            .filter(|id| *id <= 10)
            .count();
        assert!(hot >= 800);
    }

    #[test]
    fn test_write_schedule() {
        let workload = workload();
        assert!(!workload.is_write(0));
        assert!(workload.is_write(9));
        assert!(workload.is_write(19));

        let reads_only = Workload {
            write_every: 0,
            ..workload
        };
        assert!(!reads_only.is_write(9));
    }

    #[tokio::test]
    async fn test_run_workload_counts_every_request() {
        let workload = workload();
        let (engine, catalog) = build_engine(&EngineConfig::default(), &workload).unwrap();
        let engine = Arc::new(engine);

        let report = run_workload(engine, &catalog, &workload, Strategy::CacheAside)
            .await
            .unwrap();

        assert_eq!(report.served + report.pending + report.not_found, 200);
        assert_eq!(report.errors, 0);
        assert!(report.stats.hits > 0);
        assert!(report.source_reads < 200);
        assert_eq!(report.source_writes, 20);
    }

    #[tokio::test]
    async fn test_read_path_write_reaches_catalog_and_invalidates() {
        let workload = Workload {
            requests: 10,
            concurrency: 1,
            photos: 1,
            latency_ms: 0,
            write_every: 10,
        };
        let (engine, catalog) = build_engine(&EngineConfig::default(), &workload).unwrap();
        let engine = Arc::new(engine);

        run_workload(Arc::clone(&engine), &catalog, &workload, Strategy::CacheAside)
            .await
            .unwrap();
        assert_eq!(catalog.writes(), 1);

        // The like landed in the catalog and the stale detail was dropped
        let detail = engine
            .invoke(Strategy::CacheAside, "photoDetail", &[Scalar::from(1)])
            .await
            .unwrap();
        match detail {
            Outcome::Value(photo) => assert_eq!(photo["likes"], 1),
            other => panic!("expected photo detail, got {:?}", other),
        }
    }
}
