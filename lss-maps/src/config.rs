use crate::healpix::Nside;
use serde::Deserialize;

/// Resolution at which survey masks are built before degrading.
pub const MASK_NSIDE: u32 = 256;

fn default_mask_nside() -> Nside {
    Nside::new_unchecked(MASK_NSIDE)
}

/// `maps` configuration section.
///
/// ```yaml
/// maps:
///   nside: 128
///   mask_nside: 256
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    pub nside: Nside,
    #[serde(default = "default_mask_nside")]
    pub mask_nside: Nside,
}
