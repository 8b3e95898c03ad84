//! Strategy comparison harness
//!
//! Builds one random block sequence, replaces a single block, then times each
//! strategy against its own copy of the pre-replacement table. Every run goes
//! through a `CountingSource` so the report shows how much raw content each
//! strategy had to read.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use ripple_checksum::{apply, BlockSequence, ChecksumTable, CountingSource, Crc32};
use ripple_core::config::HarnessConfig;
use ripple_core::{RippleError, StrategyKind};

/// Timing and access counts for one strategy
#[derive(Debug, Clone, Serialize)]
pub struct StrategyTiming {
    pub strategy: StrategyKind,
    /// Fastest trial, in seconds
    pub best_secs: f64,
    /// Mean over all trials, in seconds
    pub mean_secs: f64,
    /// Content reads per trial
    pub content_reads: usize,
    /// Raw bytes read per trial
    pub bytes_read: u64,
    /// Bytes fed to the checksum function per trial
    pub bytes_hashed: u64,
    pub entries_rewritten: usize,
    /// Outcome of the rebuild-and-compare check (`None` when disabled)
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub blocks: usize,
    pub block_size: usize,
    pub modify_index: usize,
    pub trials: u32,
    pub seed: u64,
    pub results: Vec<StrategyTiming>,
}

impl HarnessReport {
    pub fn result(&self, strategy: StrategyKind) -> Option<&StrategyTiming> {
        self.results.iter().find(|r| r.strategy == strategy)
    }
}

/// Random lowercase ASCII, matching the shape of the original experiment data
fn random_block(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect()
}

pub fn run(config: &HarnessConfig, progress: &ProgressBar) -> Result<HarnessReport> {
    config.validate().context("invalid harness configuration")?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    info!(
        blocks = config.blocks,
        block_size = config.block_size,
        modify_index = config.modify_index,
        seed,
        "building block sequence"
    );

    let mut seq = BlockSequence::new(
        (0..config.blocks).map(|_| random_block(&mut rng, config.block_size)),
    );
    let algebra = Crc32::new();
    let baseline = ChecksumTable::rebuild(&algebra, &seq).context("building baseline table")?;

    let replacement = random_block(&mut rng, config.block_size);
    seq.replace(config.modify_index, replacement)
        .context("replacing block")?;

    progress.set_length(config.strategies.len() as u64 * u64::from(config.trials));

    let mut results = Vec::with_capacity(config.strategies.len());
    for &kind in &config.strategies {
        progress.set_message(kind.to_string());

        let mut elapsed = Vec::with_capacity(config.trials as usize);
        let mut last = None;
        for trial in 0..config.trials {
            let mut table = baseline.clone();
            let counting = CountingSource::new(&seq);

            let start = Instant::now();
            let report = apply(kind, &algebra, &counting, &mut table, config.modify_index)
                .with_context(|| format!("running {kind} update"))?;
            let took = start.elapsed();

            debug!(strategy = %kind, trial, micros = took.as_micros() as u64, "trial finished");
            elapsed.push(took);
            last = Some((table, report, counting.read_count(), counting.bytes_read()));
            progress.inc(1);
        }

        let (table, report, content_reads, bytes_read) =
            last.context("harness ran zero trials")?;

        let verified = if config.verify {
            match table.verify(&algebra, &seq) {
                Ok(()) => Some(true),
                Err(RippleError::InconsistentTable { index }) => {
                    warn!(strategy = %kind, index, "table does not match rebuild");
                    Some(false)
                }
                Err(e) => return Err(e).context("verifying table"),
            }
        } else {
            None
        };

        results.push(StrategyTiming {
            strategy: kind,
            best_secs: elapsed.iter().min().copied().unwrap_or_default().as_secs_f64(),
            mean_secs: mean(&elapsed).as_secs_f64(),
            content_reads,
            bytes_read,
            bytes_hashed: report.bytes_hashed,
            entries_rewritten: report.entries_rewritten,
            verified,
        });
    }

    Ok(HarnessReport {
        blocks: config.blocks,
        block_size: config.block_size,
        modify_index: config.modify_index,
        trials: config.trials,
        seed,
        results,
    })
}

fn mean(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    samples.iter().sum::<Duration>() / samples.len() as u32
}

/// Render the report as an aligned text table.
pub fn render_table(report: &HarnessReport) -> String {
    let mut out = format!(
        "{} blocks x {} bytes, block {} replaced, {} trial(s), seed {}\n\n",
        report.blocks, report.block_size, report.modify_index, report.trials, report.seed
    );
    out.push_str(&format!(
        "{:<10} {:>12} {:>12} {:>7} {:>12} {:>14} {:>8} {:>9}\n",
        "strategy", "best (s)", "mean (s)", "reads", "bytes read", "bytes hashed", "entries", "verified"
    ));
    for r in &report.results {
        let verified = match r.verified {
            Some(true) => "ok",
            Some(false) => "FAILED",
            None => "-",
        };
        out.push_str(&format!(
            "{:<10} {:>12.6} {:>12.6} {:>7} {:>12} {:>14} {:>8} {:>9}\n",
            r.strategy.as_str(),
            r.best_secs,
            r.mean_secs,
            r.content_reads,
            r.bytes_read,
            r.bytes_hashed,
            r.entries_rewritten,
            verified
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> HarnessConfig {
        HarnessConfig {
            blocks: 6,
            block_size: 256,
            modify_index: 2,
            trials: 2,
            seed: Some(1234),
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn all_strategies_verify() {
        let report = run(&small_config(), &ProgressBar::hidden()).unwrap();

        assert_eq!(report.results.len(), 3);
        for r in &report.results {
            assert_eq!(r.verified, Some(true), "{} failed verification", r.strategy);
            assert_eq!(r.entries_rewritten, 4);
        }
    }

    #[test]
    fn content_access_counts() {
        let report = run(&small_config(), &ProgressBar::hidden()).unwrap();

        let ripple = report.result(StrategyKind::Ripple).unwrap();
        assert_eq!(ripple.content_reads, 1);
        assert_eq!(ripple.bytes_read, 256);
        assert_eq!(ripple.bytes_hashed, 256);

        let naive = report.result(StrategyKind::Naive).unwrap();
        assert_eq!(naive.content_reads, 4);
        assert_eq!(naive.bytes_hashed, 4 * 256);

        // Trivial reads every block and hashes prefixes of 3..=6 blocks
        let trivial = report.result(StrategyKind::Trivial).unwrap();
        assert_eq!(trivial.content_reads, 6);
        assert_eq!(trivial.bytes_hashed, (3 + 4 + 5 + 6) * 256);
    }

    #[test]
    fn seed_is_reported_and_reproducible() {
        let a = run(&small_config(), &ProgressBar::hidden()).unwrap();
        let b = run(&small_config(), &ProgressBar::hidden()).unwrap();
        assert_eq!(a.seed, 1234);
        assert_eq!(a.seed, b.seed);
    }

    #[test]
    fn strategy_subset_and_order() {
        let config = HarnessConfig {
            strategies: vec![StrategyKind::Naive, StrategyKind::Ripple],
            verify: false,
            ..small_config()
        };
        let report = run(&config, &ProgressBar::hidden()).unwrap();
        let order: Vec<_> = report.results.iter().map(|r| r.strategy).collect();
        assert_eq!(order, vec![StrategyKind::Naive, StrategyKind::Ripple]);
        assert!(report.results.iter().all(|r| r.verified.is_none()));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = HarnessConfig {
            modify_index: 6,
            ..small_config()
        };
        assert!(run(&config, &ProgressBar::hidden()).is_err());
    }

    #[test]
    fn table_lists_every_strategy() {
        let report = run(&small_config(), &ProgressBar::hidden()).unwrap();
        let text = render_table(&report);
        for kind in StrategyKind::ALL {
            assert!(text.contains(kind.as_str()));
        }
        assert!(text.contains("seed 1234"));
    }
}
