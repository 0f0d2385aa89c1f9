//! Rank-based fitness shaping and the default strategy parameters.

use ndarray::prelude::*;

/// Initial step scale applied to the starting scale vector.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Center learning rate.
pub const DEFAULT_ETA_CENTER: f64 = 1.0;

/// Default population size, `4 + floor(3 ln d)`.
pub fn default_population_count(solution_length: usize) -> usize {
    4 + (3.0 * (solution_length as f64).ln()).floor() as usize
}

/// Default scale learning rate, `(3 + ln d) / (5 sqrt d)`.
pub fn default_eta_sigma(solution_length: usize) -> f64 {
    let d = solution_length as f64;
    (3.0 + d.ln()) / (5.0 * d.sqrt())
}

/// Utility weights indexed by descending-fitness rank (index 0 is the best
/// candidate).
///
/// Raw utilities are `max(0, ln(n/2 + 1) - ln(1 + i))`, normalised to sum to
/// one and then shifted by `-1/n`, so the table sums to zero up to rounding and
/// only the top half of the population pulls the distribution toward itself.
pub fn utility_weights(n: usize) -> Array1<f64> {
    let top = (n as f64 / 2.0 + 1.0).ln();
    let mut weights = Array1::from_shape_fn(n, |i| (top - (1.0 + i as f64).ln()).max(0.0));
    let sum = weights.sum();
    let shift = 1.0 / n as f64;
    weights.mapv_inplace(|u| u / sum - shift);
    weights
}
