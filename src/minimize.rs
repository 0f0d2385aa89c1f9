pub mod snes;
pub mod utility;

pub use self::snes::{Phase, Snes, SnesBuilder, SnesResult};
pub use self::utility::{
    default_eta_sigma, default_population_count, utility_weights, DEFAULT_ALPHA,
    DEFAULT_ETA_CENTER,
};
pub use crate::error::MinimizerError;
