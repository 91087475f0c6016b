//! Background cosmology for projected large-scale-structure tracers.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`params`] | [`CosmologyParams`], typed and loadable from YAML |
//! | [`background`] | [`Cosmology`]: `H(a)`, distances, growth |
//! | [`isw`] | [`IswTracer`] radial kernel |

pub mod background;
pub mod isw;
pub mod params;

pub use background::{Cosmology, A_MIN};
pub use isw::{IswTracer, DEFAULT_N_CHI, DEFAULT_Z_MAX};
pub use params::CosmologyParams;
