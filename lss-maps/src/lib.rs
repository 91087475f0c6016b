//! HEALPix sky maps for large-scale-structure analyses.
//!
//! Maps are plain `Vec<f64>` in RING order with `12 nside²` entries.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`healpix`] | [`Nside`], RING/NEST pixel indexing, ring geometry |
//! | [`maps`] | [`get_map`] count maps, [`get_mean_map`] |
//! | [`mask`] | [`Mask`], [`MaskedMap`], [`get_masked_map`], [`add_mask`] |
//! | [`resample`] | [`ud_grade`], [`transform_map_and_mask_to_nside`] |
//! | [`density`] | [`get_overdensity_map`], [`get_masked_overdensity_map`], [`get_shot_noise`] |
//! | [`config`] | [`MapConfig`] |

pub mod config;
pub mod density;
pub mod healpix;
pub mod maps;
pub mod mask;
pub mod resample;

pub use config::{MapConfig, MASK_NSIDE};
pub use density::{get_masked_overdensity_map, get_overdensity_map, get_shot_noise};
pub use healpix::{
    ang2pix_nest, ang2pix_ring, lonlat_to_thetaphi, nest2ring, pix2ang_ring, ring2nest, ring_info,
    Nside, RingInfo,
};
pub use maps::{get_map, get_mean_map};
pub use mask::{add_mask, get_masked_map, Mask, MaskedMap};
pub use resample::{transform_map_and_mask_to_nside, ud_grade};
