//! `starmap_core`: catalog types for the star map.
//!
//! No IO. Enumerations, table shapes, distribution checks and crafting graph
//! analysis. Loading lives in `starmap_catalog`.

pub mod craft;
pub mod distribution;
mod system;
mod types;

pub use craft::{crafting_order, raw_requirements, CraftError};
pub use distribution::{
    check_distribution, distribution_deviation, sample, DistributionError, TOLERANCE,
};
pub use system::*;
pub use types::*;
