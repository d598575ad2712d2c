// ============================================================
// Layer 5 — Training Session State
// ============================================================
// Everything the training loop mutates besides the model:
//
//   Initializing ──begin_epoch──▶ EpochRunning
//   EpochRunning ──record_batch─▶ BatchRunning ──record_batch─▶ ...
//   BatchRunning ──end_epoch────▶ EpochRunning   (epochs left)
//                              ▶ Finished       (last epoch done)
//
// The running loss is summed per batch and reported (as a mean
// over the interval) every `report_every` batches, then reset.

use crate::infra::metrics::EpochMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    EpochRunning,
    BatchRunning,
    Finished,
}

// ─── RunningLoss ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct RunningLoss {
    interval: usize,
    sum:      f64,
}

impl RunningLoss {
    /// # Panics
    /// Panics if `interval` is zero.
    pub fn new(interval: usize) -> Self {
        assert!(interval > 0, "report interval must be greater than zero");
        Self { interval, sum: 0.0 }
    }

    /// Add one batch loss. On batch `interval - 1`, `2 * interval - 1`, ...
    /// returns the mean over the interval and resets the sum to zero.
    pub fn record(&mut self, batch_index: usize, loss: f64) -> Option<f64> {
        self.sum += loss;
        if batch_index % self.interval == self.interval - 1 {
            let mean = self.sum / self.interval as f64;
            self.sum = 0.0;
            Some(mean)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.sum = 0.0;
    }
}

// ─── TrainingSession ──────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TrainingSession {
    total_epochs:  usize,
    /// Epochs completed so far
    epoch:         usize,
    phase:         Phase,
    running:       RunningLoss,
    epoch_loss:    f64,
    epoch_batches: usize,
}

impl TrainingSession {
    pub fn new(total_epochs: usize, report_every: usize) -> Self {
        Self {
            total_epochs,
            epoch: 0,
            phase: if total_epochs == 0 { Phase::Finished } else { Phase::Initializing },
            running: RunningLoss::new(report_every),
            epoch_loss: 0.0,
            epoch_batches: 0,
        }
    }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn epoch(&self) -> usize { self.epoch }

    pub fn total_epochs(&self) -> usize { self.total_epochs }

    pub fn is_finished(&self) -> bool { self.phase == Phase::Finished }

    /// Start the next epoch; returns its zero-based index.
    pub fn begin_epoch(&mut self) -> usize {
        debug_assert!(!self.is_finished(), "no epochs left");
        self.phase         = Phase::EpochRunning;
        self.epoch_loss    = 0.0;
        self.epoch_batches = 0;
        self.running.reset();
        self.epoch
    }

    /// Account for one optimizer step. Returns the running-loss report
    /// when `batch_index` closes a report interval.
    pub fn record_batch(&mut self, batch_index: usize, loss: f64) -> Option<f64> {
        self.phase          = Phase::BatchRunning;
        self.epoch_loss    += loss;
        self.epoch_batches += 1;
        self.running.record(batch_index, loss)
    }

    pub fn end_epoch(&mut self) -> EpochMetrics {
        let metrics = EpochMetrics::new(self.epoch + 1, self.epoch_batches, self.epoch_loss);
        self.epoch += 1;
        self.phase  = if self.epoch >= self.total_epochs {
            Phase::Finished
        } else {
            Phase::EpochRunning
        };
        metrics
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_only_on_interval_boundaries() {
        let mut running = RunningLoss::new(2000);
        let reports: Vec<usize> = (0..6000)
            .filter_map(|i| running.record(i, 1.0).map(|_| i))
            .collect();
        assert_eq!(reports, vec![1999, 3999, 5999]);
    }

    #[test]
    fn test_resets_to_zero_after_report() {
        let mut running = RunningLoss::new(2000);
        for i in 0..1999 {
            assert_eq!(running.record(i, 0.5), None);
        }
        let mean = running.record(1999, 0.5).unwrap();
        assert!((mean - 0.5).abs() < 1e-12);

        // a second interval of 2.0 reports exactly 2.0: nothing carried over
        for i in 2000..3999 {
            assert_eq!(running.record(i, 2.0), None);
        }
        let mean = running.record(3999, 2.0).unwrap();
        assert!((mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_is_over_the_interval() {
        let mut running = RunningLoss::new(4);
        let out: Vec<Option<f64>> = [1.0, 2.0, 3.0, 6.0].iter()
            .enumerate()
            .map(|(i, &l)| running.record(i, l))
            .collect();
        assert_eq!(out, vec![None, None, None, Some(3.0)]);
    }

    #[test]
    #[should_panic]
    fn test_zero_interval_panics() {
        let _ = RunningLoss::new(0);
    }

    #[test]
    fn test_phases_through_two_epochs() {
        let mut session = TrainingSession::new(2, 2);
        assert_eq!(session.phase(), Phase::Initializing);

        assert_eq!(session.begin_epoch(), 0);
        assert_eq!(session.phase(), Phase::EpochRunning);
        assert_eq!(session.record_batch(0, 1.0), None);
        assert_eq!(session.phase(), Phase::BatchRunning);
        assert_eq!(session.record_batch(1, 3.0), Some(2.0));
        session.record_batch(2, 5.0);

        let m = session.end_epoch();
        assert_eq!((m.epoch, m.batches), (1, 3));
        assert_eq!(m.total_loss, 9.0);
        assert_eq!(session.phase(), Phase::EpochRunning);

        // running loss does not leak across epochs: 5.0 from batch 2
        // above would otherwise be part of this report
        assert_eq!(session.begin_epoch(), 1);
        assert_eq!(session.record_batch(0, 1.0), None);
        assert_eq!(session.record_batch(1, 3.0), Some(2.0));
        session.end_epoch();

        assert!(session.is_finished());
        assert_eq!(session.epoch(), 2);
    }

    #[test]
    fn test_zero_epochs_is_finished_immediately() {
        let session = TrainingSession::new(0, 2000);
        assert!(session.is_finished());
    }
}
