//! Separable natural evolution strategy (SNES).
//!
//! The search distribution is a diagonal Gaussian: one mean (`center`) and one
//! standard deviation (`scale`) per dimension. Each epoch the caller `ask`s for
//! a population, scores every candidate (higher is better) and `tell`s the
//! scores back; the update uses only the rank order of the scores.
//!
//! ```
//! use snes::minimize::SnesBuilder;
//!
//! let mut snes = SnesBuilder::new()
//!     .solution_length(2)
//!     .alpha(1.0)
//!     .seed([1, 2, 3, 4])
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..200 {
//!     let population = snes.ask();
//!     let fitness: Vec<f64> = population
//!         .outer_iter()
//!         .map(|x| -(x[0] - 1.0).powi(2) - (x[1] + 2.0).powi(2))
//!         .collect();
//!     snes.tell(&fitness).unwrap();
//! }
//!
//! assert!((snes.center()[0] - 1.0).abs() < 1e-3);
//! assert!((snes.center()[1] + 2.0).abs() < 1e-3);
//! ```

use crate::error::MinimizerError;
use crate::minimize::utility::{
    default_eta_sigma, default_population_count, utility_weights, DEFAULT_ALPHA,
    DEFAULT_ETA_CENTER,
};
use crate::random::{generate_seed, Seed, Xorshift128};
use ndarray::prelude::*;
use ndarray::Zip;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// Where the optimizer is in its ask/tell cycle.
///
/// The phase is tracked for diagnostics only. Calling `tell` without a fresh
/// `ask`, or `ask` twice in a row, is allowed; the update then pairs the scores
/// with whatever noise the most recent `ask` drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ReadyToAsk,
    ReadyToTell,
}

/// Result of [`Snes::optimize`]
#[derive(Debug, Clone)]
pub struct SnesResult {
    pub center: Array1<f64>,
    pub scale: Array1<f64>,
    pub xbest: Array1<f64>,
    pub fbest: f64,
    pub epochs: usize,
    pub fn_evals: usize,
    pub history: Vec<f64>,
}

/// Configuration for [`Snes`].
///
/// Unset optional fields fall back to the usual SNES defaults for the solution
/// length. Serializable, so a run can be described in a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnesBuilder {
    solution_length: usize,
    population_count: Option<usize>,
    alpha: f64,
    eta_center: f64,
    eta_sigma: Option<f64>,
    center: Option<Vec<f64>>,
    scale: Option<Vec<f64>>,
    seed: Option<Seed>,
}

impl SnesBuilder {
    pub fn new() -> Self {
        SnesBuilder::default()
    }

    pub fn solution_length(mut self, solution_length: usize) -> Self {
        self.solution_length = solution_length;
        self
    }

    pub fn population_count(mut self, population_count: usize) -> Self {
        self.population_count = Some(population_count);
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn eta_center(mut self, eta_center: f64) -> Self {
        self.eta_center = eta_center;
        self
    }

    pub fn eta_sigma(mut self, eta_sigma: f64) -> Self {
        self.eta_sigma = Some(eta_sigma);
        self
    }

    pub fn center(mut self, center: impl Into<Vec<f64>>) -> Self {
        self.center = Some(center.into());
        self
    }

    /// Starting scale before `alpha` is applied.
    pub fn scale(mut self, scale: impl Into<Vec<f64>>) -> Self {
        self.scale = Some(scale.into());
        self
    }

    pub fn seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build with the configured seed.
    ///
    /// # Errors
    /// * `Configuration` if no seed was set
    /// * see [`SnesBuilder::build_with_entropy`] for the remaining checks
    pub fn build(self) -> Result<Snes, MinimizerError> {
        let seed = self.seed.ok_or_else(|| {
            MinimizerError::Configuration(
                "no seed supplied; set one or build with an entropy source".to_string(),
            )
        })?;
        self.build_seeded(seed)
    }

    /// Build, drawing a seed from `entropy` when none was configured.
    ///
    /// # Errors
    /// * `InvalidDimension` if the solution length is zero
    /// * `InvalidParameters` for a population below two, a non-positive alpha,
    ///   non-finite learning rates or a non-positive starting scale
    /// * `DimensionMismatch` if the starting center or scale has the wrong length
    pub fn build_with_entropy<R>(self, entropy: &mut R) -> Result<Snes, MinimizerError>
    where
        R: RngCore + ?Sized,
    {
        let seed = self.seed.unwrap_or_else(|| generate_seed(entropy));
        self.build_seeded(seed)
    }

    fn build_seeded(self, seed: Seed) -> Result<Snes, MinimizerError> {
        let d = self.solution_length;
        if d == 0 {
            return Err(MinimizerError::InvalidDimension);
        }

        let n = self
            .population_count
            .unwrap_or_else(|| default_population_count(d));
        if n < 2 {
            return Err(MinimizerError::InvalidParameters(format!(
                "population count must be at least 2, got {}",
                n
            )));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(MinimizerError::InvalidParameters(format!(
                "alpha must be positive and finite, got {}",
                self.alpha
            )));
        }
        let eta_sigma = self.eta_sigma.unwrap_or_else(|| default_eta_sigma(d));
        if !self.eta_center.is_finite() || !eta_sigma.is_finite() {
            return Err(MinimizerError::InvalidParameters(
                "learning rates must be finite".to_string(),
            ));
        }

        let center = match self.center {
            Some(center) => {
                check_len(d, center.len())?;
                Array1::from(center)
            }
            None => Array1::zeros(d),
        };

        let mut scale = match self.scale {
            Some(scale) => {
                check_len(d, scale.len())?;
                if scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
                    return Err(MinimizerError::InvalidParameters(
                        "scale entries must be positive and finite".to_string(),
                    ));
                }
                Array1::from(scale)
            }
            None => Array1::ones(d),
        };
        scale *= self.alpha;

        debug!(
            solution_length = d,
            population_count = n,
            alpha = self.alpha,
            eta_center = self.eta_center,
            eta_sigma,
            "snes initialised"
        );

        Ok(Snes {
            solution_length: d,
            population_count: n,
            eta_center: self.eta_center,
            eta_sigma,
            center,
            scale,
            weights: utility_weights(n),
            noise: Array2::zeros((n, d)),
            population: Array2::zeros((n, d)),
            ranks: (0..n).collect(),
            rng: Xorshift128::new(seed),
            phase: Phase::ReadyToAsk,
            epochs: 0,
        })
    }
}

impl Default for SnesBuilder {
    fn default() -> Self {
        Self {
            solution_length: 0,
            population_count: None,
            alpha: DEFAULT_ALPHA,
            eta_center: DEFAULT_ETA_CENTER,
            eta_sigma: None,
            center: None,
            scale: None,
            seed: None,
        }
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), MinimizerError> {
    if expected == found {
        Ok(())
    } else {
        Err(MinimizerError::DimensionMismatch { expected, found })
    }
}

/// Descending order with NaN ranked below every number.
fn by_descending_fitness(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// SNES optimizer state. Single owner; not meant to be shared across threads
/// without external locking.
#[derive(Debug, Clone)]
pub struct Snes {
    solution_length: usize,
    population_count: usize,
    eta_center: f64,
    eta_sigma: f64,
    center: Array1<f64>,
    scale: Array1<f64>,
    weights: Array1<f64>,
    // N x D, row i belongs to candidate i
    noise: Array2<f64>,
    population: Array2<f64>,
    ranks: Vec<usize>,
    rng: Xorshift128,
    phase: Phase,
    epochs: usize,
}

impl Snes {
    pub fn solution_length(&self) -> usize {
        self.solution_length
    }

    pub fn population_count(&self) -> usize {
        self.population_count
    }

    pub fn eta_center(&self) -> f64 {
        self.eta_center
    }

    pub fn eta_sigma(&self) -> f64 {
        self.eta_sigma
    }

    pub fn center(&self) -> ArrayView1<'_, f64> {
        self.center.view()
    }

    pub fn scale(&self) -> ArrayView1<'_, f64> {
        self.scale.view()
    }

    /// Utility weights by rank, best first.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    /// Standard normal noise drawn by the most recent `ask`.
    pub fn noise(&self) -> ArrayView2<'_, f64> {
        self.noise.view()
    }

    /// Population produced by the most recent `ask`.
    pub fn population(&self) -> ArrayView2<'_, f64> {
        self.population.view()
    }

    pub fn rng(&self) -> &Xorshift128 {
        &self.rng
    }

    pub fn rng_mut(&mut self) -> &mut Xorshift128 {
        &mut self.rng
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of completed `tell` calls.
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    /// Sample a fresh population, one candidate per row:
    /// `x[i][j] = center[j] + scale[j] * z[i][j]` with `z ~ N(0, 1)`.
    pub fn ask(&mut self) -> ArrayView2<'_, f64> {
        if self.phase == Phase::ReadyToTell {
            warn!(
                epoch = self.epochs,
                "ask() called again before tell(); the previous population is discarded"
            );
        }

        // Row-major fill keeps the draw order candidate by candidate.
        for z in self.noise.iter_mut() {
            *z = self.rng.next_gaussian();
        }
        for (x, z) in self
            .population
            .outer_iter_mut()
            .zip(self.noise.outer_iter())
        {
            Zip::from(x)
                .and(&self.center)
                .and(&self.scale)
                .and(z)
                .for_each(|xi, &c, &s, &zi| *xi = c + s * zi);
        }

        self.phase = Phase::ReadyToTell;
        self.population.view()
    }

    /// The candidate at `index` within a population returned by `ask`.
    pub fn solution_at<'a>(
        population: ArrayView2<'a, f64>,
        index: usize,
    ) -> Result<ArrayView1<'a, f64>, MinimizerError> {
        let len = population.nrows();
        if index >= len {
            return Err(MinimizerError::IndexOutOfRange { index, len });
        }
        Ok(population.index_axis_move(Axis(0), index))
    }

    /// Update center and scale from the scores of the last `ask`ed population.
    ///
    /// Candidates are ranked by descending fitness with a stable sort, so ties
    /// keep their original order. Only the ranks enter the update.
    ///
    /// # Errors
    /// * `DimensionMismatch` if `fitnesses.len()` differs from the population
    ///   count; nothing is modified in that case
    pub fn tell(&mut self, fitnesses: &[f64]) -> Result<(), MinimizerError> {
        check_len(self.population_count, fitnesses.len())?;
        if self.phase == Phase::ReadyToAsk {
            warn!(
                epoch = self.epochs,
                "tell() called without a fresh ask(); reusing the previous noise"
            );
        }

        for (i, rank) in self.ranks.iter_mut().enumerate() {
            *rank = i;
        }
        self.ranks
            .sort_by(|&a, &b| by_descending_fitness(fitnesses[a], fitnesses[b]));

        for j in 0..self.solution_length {
            let z = self.noise.column(j);
            let mut delta_mu = 0.0;
            let mut delta_sigma = 0.0;
            for (&w, &idx) in self.weights.iter().zip(&self.ranks) {
                let zi = z[idx];
                delta_mu += w * zi;
                delta_sigma += w * (zi * zi - 1.0);
            }
            self.center[j] += self.eta_center * self.scale[j] * delta_mu;
            self.scale[j] *= (0.5 * self.eta_sigma * delta_sigma).exp();
        }

        self.epochs += 1;
        self.phase = Phase::ReadyToAsk;
        trace!(
            epoch = self.epochs,
            best = fitnesses[self.ranks[0]],
            "snes updated"
        );
        Ok(())
    }

    /// Run `epochs` ask/tell cycles, scoring candidates with `f` (higher is
    /// better).
    ///
    /// # Errors
    /// * `FunctionEvaluationError` if `f` returns a non-finite score; center
    ///   and scale keep the values of the last completed epoch
    pub fn optimize<F>(&mut self, mut f: F, epochs: usize) -> Result<SnesResult, MinimizerError>
    where
        F: FnMut(ArrayView1<f64>) -> f64,
    {
        let mut fitness = vec![0.0; self.population_count];
        let mut xbest = self.center.clone();
        let mut fbest = f64::NEG_INFINITY;
        let mut history = Vec::with_capacity(epochs);
        let mut fn_evals = 0;

        for _ in 0..epochs {
            let population = self.ask();
            let mut epoch_best = f64::NEG_INFINITY;
            for (i, x) in population.outer_iter().enumerate() {
                let value = f(x);
                fn_evals += 1;
                if !value.is_finite() {
                    return Err(MinimizerError::FunctionEvaluationError);
                }
                if value > fbest {
                    fbest = value;
                    xbest = x.to_owned();
                }
                epoch_best = epoch_best.max(value);
                fitness[i] = value;
            }
            self.tell(&fitness)?;
            history.push(epoch_best);
            debug!(epoch = self.epochs, best = epoch_best, "snes epoch");
        }

        Ok(SnesResult {
            center: self.center.clone(),
            scale: self.scale.clone(),
            xbest,
            fbest,
            epochs: self.epochs,
            fn_evals,
            history,
        })
    }
}
