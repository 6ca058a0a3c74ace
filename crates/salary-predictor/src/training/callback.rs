//! Early stopping callback for training.
//!
//! Monitors a validation metric and stops training when no improvement is seen
//! for a specified number of rounds.

/// Outcome of feeding one round's metric to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EarlyStopAction {
    /// New best value.
    Improved,
    /// No improvement, still within patience.
    Continue,
    /// Patience exhausted.
    Stop,
}

/// Early stopping state.
///
/// A patience of `0` disables early stopping.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    higher_is_better: bool,
    best_value: Option<f64>,
    best_round: usize,
    current_round: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize, higher_is_better: bool) -> Self {
        Self {
            patience,
            higher_is_better,
            best_value: None,
            best_round: 0,
            current_round: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.patience > 0
    }

    /// Record a metric value for the current round.
    pub fn update(&mut self, value: f64) -> EarlyStopAction {
        let improved = match self.best_value {
            None => true,
            Some(best) if self.higher_is_better => value > best,
            Some(best) => value < best,
        };

        let round = self.current_round;
        self.current_round += 1;

        if improved {
            self.best_value = Some(value);
            self.best_round = round;
            EarlyStopAction::Improved
        } else if round - self.best_round >= self.patience {
            EarlyStopAction::Stop
        } else {
            EarlyStopAction::Continue
        }
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_value
    }

    /// Round (0-based) at which the best value was observed.
    pub fn best_round(&self) -> usize {
        self.best_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_stop_while_improving() {
        let mut es = EarlyStopping::new(2, false);
        for v in [5.0, 4.0, 3.0, 2.0] {
            assert_eq!(es.update(v), EarlyStopAction::Improved);
        }
        assert_eq!(es.best_value(), Some(2.0));
        assert_eq!(es.best_round(), 3);
    }

    #[test]
    fn stops_after_patience_rounds_without_improvement() {
        let mut es = EarlyStopping::new(2, false);
        assert_eq!(es.update(1.0), EarlyStopAction::Improved);
        assert_eq!(es.update(1.5), EarlyStopAction::Continue);
        assert_eq!(es.update(1.2), EarlyStopAction::Stop);
        assert_eq!(es.best_round(), 0);
    }

    #[test]
    fn higher_is_better() {
        let mut es = EarlyStopping::new(1, true);
        assert_eq!(es.update(0.5), EarlyStopAction::Improved);
        assert_eq!(es.update(0.7), EarlyStopAction::Improved);
        assert_eq!(es.update(0.6), EarlyStopAction::Stop);
    }

    #[test]
    fn zero_patience_is_disabled() {
        assert!(!EarlyStopping::new(0, false).is_enabled());
    }
}
