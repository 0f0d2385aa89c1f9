//! Separable natural evolution strategy with a reproducible xorshift128
//! sampling engine.
//!
//! [`minimize::Snes`] runs the ask/tell cycle; [`random::Xorshift128`] is the
//! seeded generator behind its Gaussian draws.

pub mod error;
pub mod minimize;
pub mod prelude;
pub mod random;

pub use error::MinimizerError;
