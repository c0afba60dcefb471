use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tracing::info;

mod config;

use config::Config;
use tennis_odds::bridge::precompute::{format_tag, precompute_level};
use tennis_odds::store::GridStore;

fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Size the pool before any grid evaluation touches it
    let mut pool = rayon::ThreadPoolBuilder::new();
    if config.threads > 0 {
        pool = pool.num_threads(config.threads);
    }
    pool.build_global()?;
    info!("Rayon threads: {}", rayon::current_num_threads());

    let store = GridStore::open(&config.database_path)?;
    info!(
        "Grid store opened: {} ({} grids)",
        config.database_path,
        store.count()?
    );

    let format = config.format();
    let options = config.precompute_options()?;
    info!(
        "Format {} on a {}-point grid over [{}, {}]",
        format_tag(&format),
        options.spec.size,
        options.spec.min,
        options.spec.max
    );

    for &level in &config.levels {
        let started = Instant::now();
        let grids = precompute_level(level, &format, &options)?;
        let saved = store.save_all(&grids)?;
        info!(
            "{}: saved {} grid(s) in {:.1}s",
            level,
            saved,
            started.elapsed().as_secs_f64()
        );
    }

    info!("Done: {} grids stored", store.count()?);
    Ok(())
}
