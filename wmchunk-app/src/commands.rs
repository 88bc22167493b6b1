//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use wmchunk_experiment::{ExperimentConfig, TargetDesign, TrialPlan};

use crate::app::App;

fn load_config(path: Option<&Path>) -> Result<ExperimentConfig> {
    match path {
        Some(path) => ExperimentConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ExperimentConfig::default()),
    }
}

pub fn run(
    target: PathBuf,
    results: PathBuf,
    config: Option<PathBuf>,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let mut config = load_config(config.as_deref())?;
    if timeout_ms.is_some() {
        config.response_timeout_ms = timeout_ms;
    }

    let app = App::new(config, &target, results)?;
    println!(
        "Run {}: {} trials. Press Esc to stop the run.",
        app.run_number(),
        app.trial_count()
    );

    let summary = app.run()?;
    println!("{summary}");
    Ok(())
}

pub fn validate(target: PathBuf, mask: char) -> Result<()> {
    let specs = wmchunk_store::load_trial_specs(&target)
        .with_context(|| format!("loading target file {}", target.display()))?;
    let plan = TrialPlan::new(specs, mask)
        .with_context(|| format!("invalid target file {}", target.display()))?;

    let retrievals = plan
        .trials()
        .iter()
        .filter(|t| t.chunks.is_none())
        .count();
    println!(
        "{}: {} trials ({} encoding, {} retrieval)",
        target.display(),
        plan.len(),
        plan.len() - retrievals,
        retrievals
    );
    println!(
        "Minimum duration: {:.1} s",
        plan.minimum_duration().as_secs_f64()
    );
    println!("Target file valid.");
    Ok(())
}

pub fn generate(
    out: Option<PathBuf>,
    run_number: u32,
    repetitions: usize,
    seq_length: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Result<()> {
    if seq_length == 0 {
        bail!("sequence length must be at least 1");
    }
    // retrieval rows must be masked the way `run` will read them
    let config = load_config(config.as_deref())?;
    let design = TargetDesign {
        run_number,
        repetitions,
        seq_length,
        mask: config.mask_symbol,
        seed,
        ..TargetDesign::default()
    };
    let specs = design.generate();
    let path = out.unwrap_or_else(|| PathBuf::from(format!("WMC_{run_number:02}.csv")));

    wmchunk_store::write_trial_specs(&path, &specs)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} trials to {}", specs.len(), path.display());
    Ok(())
}

pub fn summary(results: PathBuf, run_number: u32, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let records = wmchunk_store::load_results(&results)
        .with_context(|| format!("loading results {}", results.display()))?;

    let summary = config.scoring.summarize_run(&records, run_number);
    if summary.trials == 0 {
        bail!("no trials for run {run_number} in {}", results.display());
    }
    println!("{summary}");
    Ok(())
}
