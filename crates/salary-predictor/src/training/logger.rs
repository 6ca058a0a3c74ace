//! Training progress logging.
//!
//! [`TrainingLogger`] turns per-round metrics into `tracing` events, filtered
//! by [`Verbosity`]. Subscribers are installed by the binary.

use std::time::Instant;

/// How much the trainer logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Silent,
    /// Start/finish summaries and periodic round metrics.
    Info,
    /// Every round.
    Debug,
}

/// One named metric value for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub dataset: String,
    pub metric: &'static str,
    pub value: f64,
}

/// Emits training events through `tracing`.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    log_every: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            log_every: 10,
            started: None,
        }
    }

    pub fn start_training(&mut self, n_trees: usize, n_rows: usize, n_features: usize) {
        self.started = Some(Instant::now());
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_trees, n_rows, n_features, "starting gbdt training");
        }
    }

    pub fn log_round(&self, round: usize, metrics: &[MetricValue]) {
        let due = match self.verbosity {
            Verbosity::Silent => false,
            Verbosity::Info => (round + 1) % self.log_every == 0 || round == 0,
            Verbosity::Debug => true,
        };
        if !due {
            return;
        }
        let summary = metrics
            .iter()
            .map(|m| format!("{}-{}={:.4}", m.dataset, m.metric, m.value))
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(round, %summary, "boosting round");
    }

    pub fn log_early_stopping(&self, round: usize, best_round: usize, metric: &str) {
        if self.verbosity >= Verbosity::Info {
            tracing::info!(round, best_round, metric, "early stopping");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self.started.map(|s| s.elapsed().as_millis()).unwrap_or(0);
            tracing::info!(n_trees, elapsed_ms, "finished gbdt training");
        }
    }
}
