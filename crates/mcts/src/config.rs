//! MCTS configuration parameters.

/// MCTS configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Number of simulated descents per search.
    pub num_simulations: usize,

    /// PUCT exploration constant.
    pub c_puct: f32,

    /// Hard recursion ceiling for a single descent. Exceeding it returns a
    /// neutral 0.0 without touching statistics.
    pub max_depth: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 50,
            c_puct: 1.0,
            max_depth: 50,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Set the PUCT exploration constant.
    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    /// Set the recursion ceiling.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.num_simulations, 50);
        assert!((config.c_puct - 1.0).abs() < 1e-5);
        assert_eq!(config.max_depth, 50);
    }

    #[test]
    fn test_with_simulations() {
        let config = MctsConfig::with_simulations(120);
        assert_eq!(config.num_simulations, 120);
        assert_eq!(config.max_depth, 50);
    }

    #[test]
    fn test_builders() {
        let config = MctsConfig::with_simulations(10)
            .with_c_puct(1.5)
            .with_max_depth(8);
        assert!((config.c_puct - 1.5).abs() < 1e-5);
        assert_eq!(config.max_depth, 8);
    }
}
