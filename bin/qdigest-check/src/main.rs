//! Builds a q-digest from a configured batch of values and checks its quantile answers against the exact ones.

#![deny(warnings)]
#![deny(missing_docs)]

use anyhow::{bail, Context as _, Error};
use clap::Parser as _;
use tracing::{error, info, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

mod check;
use self::check::GroundTruth;

mod config;
use self::config::{Cli, Config};

mod input;

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(true)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => info!("qdigest-check stopped."),
        Err(e) => {
            error!("{:?}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    info!("qdigest-check starting...");

    let mut config = Config::try_from_file(&cli.config_path)?;
    if !cli.quantiles.is_empty() {
        config.quantiles = cli.quantiles;
    }

    let values = config.input.load()?;
    let digest = config.digest.build(&values).context("Failed to build digest.")?;
    digest.check_invariants().context("Digest failed invariant checks.")?;

    let buckets = digest.serialize();
    info!(
        count = digest.count(),
        k = digest.k(),
        sigma = digest.sigma(),
        threshold = digest.threshold(),
        tree_size = digest.tree_size(),
        buckets = buckets.len(),
        "Built digest."
    );
    info!("Buckets (index, count): {:?}", buckets);

    if digest.is_empty() {
        warn!("Input is empty; no quantiles to check.");
        return Ok(());
    }

    let truth = GroundTruth::new(values);
    let mut failures = 0;
    for &fraction in &config.quantiles {
        let check = truth
            .check(&digest, fraction)
            .with_context(|| format!("Failed to query quantile {}.", fraction))?;

        if check.passed() {
            info!(
                fraction = check.fraction,
                estimate = check.estimate,
                exact = check.exact,
                rank_error = check.rank_error,
                bound = check.bound,
                "Quantile within bounds."
            );
        } else {
            failures += 1;
            error!(
                fraction = check.fraction,
                estimate = check.estimate,
                exact = check.exact,
                rank_error = check.rank_error,
                bound = check.bound,
                "Quantile exceeds error bound."
            );
        }
    }

    if failures > 0 {
        bail!("{} of {} quantiles exceeded the error bound.", failures, config.quantiles.len());
    }

    info!("All {} quantiles within the error bound.", config.quantiles.len());

    Ok(())
}
