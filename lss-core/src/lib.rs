//! Shared foundation for the large-scale-structure toolkit.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | [`LssError`], [`MathErrorKind`], [`LssResult`] |
//! | [`constants`] | Angular, cosmological and HEALPix constants |
//! | [`math`] | `linspace`, histograms, linear and Hermite interpolation |
//! | [`config`] | Named YAML configuration sections |
//! | [`logging`] | Explicit `tracing` subscriber setup |

pub mod config;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod math;

pub use errors::{LssError, LssResult, MathErrorKind};
