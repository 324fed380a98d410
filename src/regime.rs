// 4.0: volatility regimes. a hidden three-state Markov chain governs the
// spread of per-minute returns. high self-transition probability produces
// volatility clustering instead of i.i.d. noise: calm stretches stay calm,
// storms stay stormy.
// 4.1 has the transition draw, 4.2 the regime-scaled return draw.

use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Calm,
    Normal,
    Volatile,
}

impl VolatilityRegime {
    fn index(self) -> usize {
        match self {
            VolatilityRegime::Calm => 0,
            VolatilityRegime::Normal => 1,
            VolatilityRegime::Volatile => 2,
        }
    }

    fn from_index(i: usize) -> Self {
        match i {
            0 => VolatilityRegime::Calm,
            1 => VolatilityRegime::Normal,
            _ => VolatilityRegime::Volatile,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeParams {
    /// Per-minute return sigma for each regime. Must be ordered
    /// calm < normal < volatile.
    pub calm_sigma: f64,
    pub normal_sigma: f64,
    pub volatile_sigma: f64,
    /// Row-stochastic transition matrix, rows/cols in Calm/Normal/Volatile
    /// order. Self-transition stays >= 0.9 to get clustering.
    pub transitions: [[f64; 3]; 3],
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            calm_sigma: 0.0005,    // 0.05% per minute
            normal_sigma: 0.0015,  // 0.15% per minute
            volatile_sigma: 0.004, // 0.4% per minute
            transitions: [
                [0.95, 0.04, 0.01],
                [0.025, 0.95, 0.025],
                [0.01, 0.04, 0.95],
            ],
        }
    }
}

impl RegimeParams {
    pub fn sigma(&self, regime: VolatilityRegime) -> f64 {
        match regime {
            VolatilityRegime::Calm => self.calm_sigma,
            VolatilityRegime::Normal => self.normal_sigma,
            VolatilityRegime::Volatile => self.volatile_sigma,
        }
    }
}

// 4.1: one transition draw per minute. walks the cumulative row so exactly
// one uniform is consumed regardless of outcome.
pub fn transition_regime(
    current: VolatilityRegime,
    params: &RegimeParams,
    rng: &mut SimRng,
) -> VolatilityRegime {
    let row = params.transitions[current.index()];
    let draw = rng.next_f64();

    let mut cumulative = 0.0;
    for (i, p) in row.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            return VolatilityRegime::from_index(i);
        }
    }
    // float rounding can leave the cumulative row a hair under 1.0
    current
}

// 4.2: regime-scaled return. gaussian draw is bounded in [-3, 3], so the
// return is bounded by 3 * sigma before the engine's hard clamp even applies.
pub fn draw_return(regime: VolatilityRegime, params: &RegimeParams, rng: &mut SimRng) -> f64 {
    params.sigma(regime) * rng.next_gaussian()
}
