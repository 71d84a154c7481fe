//! hf-core: stable foundation for humidiflow.
//!
//! Contains:
//! - units (uom SI types + constructors for the chamber model)
//! - numeric (Real + argument checks + sweep grids)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{HfError, HfResult};
pub use numeric::*;
pub use units::*;
