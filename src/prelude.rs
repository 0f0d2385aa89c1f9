//! snes prelude.
//!
//! The most used types and functions, importable as a group.
//!
//! ```
//! use snes::prelude::*;
//!
//! let snes = SnesBuilder::new().solution_length(4).seed([1, 2, 3, 4]).build();
//! assert!(snes.is_ok());
//! ```

#[doc(no_inline)]
pub use crate::error::MinimizerError;

#[doc(no_inline)]
pub use crate::minimize::{
    default_eta_sigma, default_population_count, utility_weights, Phase, Snes, SnesBuilder,
    SnesResult,
};

#[doc(no_inline)]
pub use crate::random::{generate_seed, Seed, Xorshift128};
