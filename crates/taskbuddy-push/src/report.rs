use tracing::{info, warn};

use crate::dispatch::DeliveryOutcome;

/// Per-token outcomes from one fan-out, kept for observability only.
/// A fully failed fan-out is recorded like any other; it never fails the
/// event that triggered it.
#[derive(Debug, Default)]
pub struct DispatchReport {
    outcomes: Vec<(String, DeliveryOutcome)>,
}

impl DispatchReport {
    pub fn new(outcomes: Vec<(String, DeliveryOutcome)>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[(String, DeliveryOutcome)] {
        &self.outcomes
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Emit the fan-out result to the log, tagged with the dispatch id the
    /// initiation line carried so the two can be correlated. Failed tokens
    /// are listed one per line with their reason so persistent offenders
    /// show up in grep.
    pub fn record(&self, dispatch_id: &str, user_id: &str) {
        info!(
            dispatch_id,
            user_id,
            delivered = self.delivered(),
            failed = self.failed(),
            "push fan-out finished"
        );

        for (token, outcome) in &self.outcomes {
            if let DeliveryOutcome::Failed(reason) = outcome {
                warn!(dispatch_id, user_id, token, %reason, "push delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::DeliveryError;

    #[test]
    fn record_tallies_outcomes_per_dispatch() {
        let report = DispatchReport::new(vec![
            ("tok-1".to_string(), DeliveryOutcome::Delivered),
            (
                "tok-2".to_string(),
                DeliveryOutcome::Failed(DeliveryError::Status(503)),
            ),
        ]);

        assert_eq!(report.delivered(), 1);
        assert_eq!(report.failed(), 1);
        report.record("d-1", "u1");
    }
}
