//! Soak command implementation: mass randomized matches with invariant
//! checking.

use super::CliError;
use indicatif::{ProgressBar, ProgressStyle};
use koth::sim::{random_scenario, run_scenario};
use rayon::prelude::*;
use std::time::Instant;

/// Aggregated soak statistics.
#[derive(Debug, Default, Clone)]
struct SoakStats {
    matches_run: u64,
    wins: Vec<u64>,
    draws: u64,
    violations: Vec<String>,
}

impl SoakStats {
    fn add(&mut self, winner: Option<u8>, violations: &[String]) {
        self.matches_run += 1;
        match winner {
            Some(alliance) => {
                let idx = usize::from(alliance);
                if self.wins.len() <= idx {
                    self.wins.resize(idx + 1, 0);
                }
                self.wins[idx] += 1;
            }
            None => self.draws += 1,
        }
        self.violations.extend_from_slice(violations);
    }

    fn merge(&mut self, other: &Self) {
        self.matches_run += other.matches_run;
        self.draws += other.draws;
        if self.wins.len() < other.wins.len() {
            self.wins.resize(other.wins.len(), 0);
        }
        for (idx, count) in other.wins.iter().enumerate() {
            self.wins[idx] += count;
        }
        self.violations.extend_from_slice(&other.violations);
    }
}

/// Execute the soak command.
///
/// # Errors
///
/// Returns an error if the thread pool cannot be built or any match
/// violated an invariant.
pub(crate) fn execute(
    matches: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    progress: bool,
) -> Result<(), CliError> {
    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::new(format!("Failed to build thread pool: {e}")))?;
    }

    let base_seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos() % u128::from(u64::MAX)).unwrap_or(42))
            .unwrap_or(42)
    });

    let pb = if progress {
        let pb = ProgressBar::new(matches);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})",
                )
                .expect("valid template")
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates into its own SoakStats, merged at the end.
    let stats = (0..matches)
        .into_par_iter()
        .fold(SoakStats::default, |mut local, i| {
            let match_seed = base_seed.wrapping_add(i);
            let scenario = random_scenario(match_seed);
            match run_scenario(&scenario) {
                Ok(outcome) => local.add(outcome.winner, &outcome.violations),
                Err(e) => local
                    .violations
                    .push(format!("seed {match_seed}: scenario rejected: {e}")),
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(SoakStats::default, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    println!();
    println!("Soak results (base seed {base_seed}):");
    println!("  Matches: {}", stats.matches_run);
    println!("  Draws:   {}", stats.draws);
    for (alliance, count) in stats.wins.iter().enumerate() {
        if *count > 0 {
            println!("  Alliance {alliance} wins: {count}");
        }
    }
    println!("  Elapsed: {:.2}s", duration.as_secs_f64());

    if stats.violations.is_empty() {
        println!("  Invariants: clean");
        Ok(())
    } else {
        println!();
        for violation in stats.violations.iter().take(10) {
            println!("VIOLATION: {violation}");
        }
        Err(CliError::new(format!(
            "{} invariant violation(s) across {} matches",
            stats.violations.len(),
            stats.matches_run
        )))
    }
}
