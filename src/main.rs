use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::info;
use ncc_sampler::{
    NestedCaseControlSampler, SamplingConfig, SyntheticCohortConfig, generate_cohort,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

/// Seed for the synthetic cohort when the sampling config has none
const DEFAULT_COHORT_SEED: u64 = 42;

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage: ncc-sampler [sampling-config.json] [cohort-config.json]
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => SamplingConfig::from_json_file(Path::new(&path))
            .with_context(|| format!("Failed to load sampling configuration from {path}"))?,
        None => SamplingConfig::builder().show_progress(true).build(),
    };

    let cohort_config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read cohort configuration from {path}"))?;
            serde_json::from_str::<SyntheticCohortConfig>(&text)
                .with_context(|| format!("Failed to parse cohort configuration from {path}"))?
        }
        None => SyntheticCohortConfig::default(),
    };

    info!("{config}");
    info!("{cohort_config}");

    let mut cohort_rng = StdRng::seed_from_u64(config.random_seed.unwrap_or(DEFAULT_COHORT_SEED));
    let cohort = generate_cohort(&cohort_config, &mut cohort_rng);

    let start = Instant::now();
    let sampler = NestedCaseControlSampler::new(config, cohort)?;
    info!("{}", sampler.build_stats());

    let table = sampler.run()?;
    let summary = sampler.summarize(&table);
    info!("{summary}");

    let batch = table.to_record_batch()?;
    info!(
        "Result table: {} rows, {} columns in {:?}",
        batch.num_rows(),
        batch.num_columns(),
        start.elapsed()
    );

    Ok(())
}
