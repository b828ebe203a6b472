//! Per-state action statistics.
//!
//! The search keys one [`NodeStats`] record per visited state hash; the
//! record holds dense per-action arrays sized to the action space. A state
//! with no record is unexpanded - records are only created on first visit,
//! never pre-allocated.

/// Visit counts, running mean values and priors for one state.
#[derive(Clone, Debug)]
pub struct NodeStats {
    visits: Vec<u32>,
    values: Vec<f32>,
    priors: Vec<f32>,
}

impl NodeStats {
    /// Create a fresh record from masked, renormalized priors.
    pub fn new(priors: Vec<f32>) -> Self {
        let n = priors.len();
        Self {
            visits: vec![0; n],
            values: vec![0.0; n],
            priors,
        }
    }

    pub fn num_actions(&self) -> usize {
        self.priors.len()
    }

    /// Visit count N(s,a).
    pub fn visits(&self, action: usize) -> u32 {
        self.visits[action]
    }

    /// Running mean value Q(s,a); 0.0 before the first visit.
    pub fn q(&self, action: usize) -> f32 {
        self.values[action]
    }

    /// Prior probability P(s,a).
    pub fn prior(&self, action: usize) -> f32 {
        self.priors[action]
    }

    /// Total visits across all actions.
    pub fn total_visits(&self) -> u32 {
        self.visits.iter().sum()
    }

    /// Raw visit counts, indexed by action.
    pub fn visit_counts(&self) -> &[u32] {
        &self.visits
    }

    /// Fold a backed-up value into the running mean:
    /// `Q ← (N·Q + v) / (N + 1)`, then `N ← N + 1`.
    pub fn record(&mut self, action: usize, value: f32) {
        let n = self.visits[action] as f32;
        self.values[action] = (n * self.values[action] + value) / (n + 1.0);
        self.visits[action] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record() {
        let stats = NodeStats::new(vec![0.25; 4]);
        assert_eq!(stats.num_actions(), 4);
        assert_eq!(stats.total_visits(), 0);
        assert_eq!(stats.visits(2), 0);
        assert_eq!(stats.q(2), 0.0);
        assert!((stats.prior(2) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_record_running_mean() {
        let mut stats = NodeStats::new(vec![0.5, 0.5]);

        stats.record(0, 1.0);
        assert_eq!(stats.visits(0), 1);
        assert!((stats.q(0) - 1.0).abs() < 1e-6);

        stats.record(0, 0.0);
        assert_eq!(stats.visits(0), 2);
        assert!((stats.q(0) - 0.5).abs() < 1e-6);

        stats.record(0, -0.5);
        assert!((stats.q(0) - (1.0 - 0.5) / 3.0).abs() < 1e-6);

        // Untouched action stays untouched.
        assert_eq!(stats.visits(1), 0);
        assert_eq!(stats.q(1), 0.0);
        assert_eq!(stats.total_visits(), 3);
    }
}
