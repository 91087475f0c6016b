//! HEALPix pixelization in the RING and NESTED schemes.
//!
//! Pixel indices follow Górski et al. (2005). RING numbers pixels along
//! iso-latitude rings from the north pole, which is what maps built here are
//! stored in and what spherical-harmonic transforms need. NEST numbers
//! pixels hierarchically inside the 12 base faces, which makes resolution
//! changes a matter of grouping consecutive indices.
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`ang2pix_ring`], [`ang2pix_nest`] | Colatitude/longitude (radians) to pixel |
//! | [`pix2ang_ring`] | Pixel centre of a RING pixel |
//! | [`nest2ring`], [`ring2nest`] | Scheme conversion |
//! | [`ring_info`] | Geometry of one iso-latitude ring |
//! | [`lonlat_to_thetaphi`] | Degrees on the sky to HEALPix angles |

use lss_core::constants::{DEG_TO_RAD, HALF_PI, PI, TWOPI};
use lss_core::{LssError, LssResult, MathErrorKind};
use serde::Deserialize;
use std::fmt;

const MAX_ORDER: u32 = 29;

/// Base-face row of the southern vertex, in units of nside.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Base-face longitude of the southern vertex, in units of π/4.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// HEALPix resolution parameter: a power of two between 1 and 2^29.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u32")]
pub struct Nside(u32);

impl Nside {
    pub fn new(nside: u32) -> LssResult<Self> {
        if nside == 0 || !nside.is_power_of_two() || nside > (1 << MAX_ORDER) {
            return Err(LssError::invalid_resolution(format!(
                "nside must be a power of two in [1, 2^{}], got {}",
                MAX_ORDER, nside
            )));
        }
        Ok(Self(nside))
    }

    /// For compile-time constants already known to be powers of two.
    pub(crate) const fn new_unchecked(nside: u32) -> Self {
        Self(nside)
    }

    pub fn from_order(order: u32) -> LssResult<Self> {
        if order > MAX_ORDER {
            return Err(LssError::invalid_resolution(format!(
                "order must be at most {}, got {}",
                MAX_ORDER, order
            )));
        }
        Ok(Self(1 << order))
    }

    /// Resolution of a full-sky map with `npix` pixels.
    pub fn from_npix(npix: usize) -> LssResult<Self> {
        let nside = ((npix / 12) as f64).sqrt().round() as u64;
        if nside == 0 || 12 * nside * nside != npix as u64 || nside > u32::MAX as u64 {
            return Err(LssError::invalid_resolution(format!(
                "{} is not a valid HEALPix pixel count",
                npix
            )));
        }
        Self::new(nside as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn order(self) -> u32 {
        self.0.trailing_zeros()
    }

    pub fn npix(self) -> usize {
        12 * (self.0 as usize) * (self.0 as usize)
    }

    /// Number of iso-latitude rings, `4 nside − 1`.
    pub fn n_rings(self) -> usize {
        4 * self.0 as usize - 1
    }

    /// Highest multipole resolved by a map at this resolution, `3 nside − 1`.
    pub fn lmax(self) -> usize {
        3 * self.0 as usize - 1
    }

    /// Solid angle of one pixel, in steradians.
    pub fn pixel_area(self) -> f64 {
        4.0 * PI / self.npix() as f64
    }

    fn n(self) -> i64 {
        self.0 as i64
    }

    /// Pixels in the north polar cap, `2 nside (nside − 1)`.
    fn ncap(self) -> i64 {
        2 * self.n() * (self.n() - 1)
    }

    fn check_pixel(self, pix: u64) -> LssResult<i64> {
        if pix >= self.npix() as u64 {
            return Err(LssError::math_error(
                "healpix pixel",
                MathErrorKind::OutOfRange,
                &format!("pixel {} outside [0, {})", pix, self.npix()),
            ));
        }
        Ok(pix as i64)
    }
}

impl TryFrom<u32> for Nside {
    type Error = LssError;

    fn try_from(value: u32) -> LssResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for Nside {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry of one iso-latitude ring (1-based ring index).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingInfo {
    /// RING index of the first pixel in the ring.
    pub first_pixel: usize,
    pub n_pixels: usize,
    /// cos θ of the ring.
    pub z: f64,
    /// Longitude of the first pixel centre.
    pub phi0: f64,
}

impl RingInfo {
    pub fn theta(&self) -> f64 {
        libm::acos(self.z)
    }
}

/// Geometry of `ring`, numbered 1 ..= 4 nside − 1 from the north pole.
pub fn ring_info(nside: Nside, ring: usize) -> LssResult<RingInfo> {
    let n = nside.n();
    let nrings = nside.n_rings();
    if ring == 0 || ring > nrings {
        return Err(LssError::math_error(
            "ring_info",
            MathErrorKind::OutOfRange,
            &format!("ring {} outside [1, {}]", ring, nrings),
        ));
    }

    let i = ring as i64;
    let fact = 1.0 / (3.0 * (n * n) as f64);
    let info = if i < n {
        RingInfo {
            first_pixel: (2 * i * (i - 1)) as usize,
            n_pixels: (4 * i) as usize,
            z: 1.0 - (i * i) as f64 * fact,
            phi0: PI / (4 * i) as f64,
        }
    } else if i <= 3 * n {
        let shifted = (i - n) & 1 == 0;
        RingInfo {
            first_pixel: (nside.ncap() + (i - n) * 4 * n) as usize,
            n_pixels: (4 * n) as usize,
            z: (2 * n - i) as f64 * 2.0 / (3 * n) as f64,
            phi0: if shifted { PI / (4 * n) as f64 } else { 0.0 },
        }
    } else {
        let s = 4 * n - i;
        RingInfo {
            first_pixel: (nside.npix() as i64 - 2 * s * (s + 1)) as usize,
            n_pixels: (4 * s) as usize,
            z: -(1.0 - (s * s) as f64 * fact),
            phi0: PI / (4 * s) as f64,
        }
    };
    Ok(info)
}

/// Converts longitude/latitude in degrees to HEALPix `(θ, φ)` in radians.
///
/// θ is the colatitude `90° − lat`. Latitudes outside [−90°, 90°] and
/// non-finite input are rejected.
pub fn lonlat_to_thetaphi(lon_deg: f64, lat_deg: f64) -> LssResult<(f64, f64)> {
    if !lon_deg.is_finite() || !lat_deg.is_finite() {
        return Err(LssError::math_error(
            "lonlat_to_thetaphi",
            MathErrorKind::NotFinite,
            &format!("coordinates ({}, {}) are not finite", lon_deg, lat_deg),
        ));
    }
    if !(-90.0..=90.0).contains(&lat_deg) {
        return Err(LssError::math_error(
            "lonlat_to_thetaphi",
            MathErrorKind::OutOfRange,
            &format!("latitude {} outside [-90, 90]", lat_deg),
        ));
    }
    let theta = ((90.0 - lat_deg) * DEG_TO_RAD).clamp(0.0, PI);
    Ok((theta, lon_deg * DEG_TO_RAD))
}

fn check_angles(theta: f64, phi: f64) -> LssResult<()> {
    if !theta.is_finite() || !phi.is_finite() {
        return Err(LssError::math_error(
            "ang2pix",
            MathErrorKind::NotFinite,
            &format!("angles ({}, {}) are not finite", theta, phi),
        ));
    }
    if !(0.0..=PI).contains(&theta) {
        return Err(LssError::math_error(
            "ang2pix",
            MathErrorKind::OutOfRange,
            &format!("colatitude {} outside [0, π]", theta),
        ));
    }
    Ok(())
}

/// φ mapped to [0, 4): the quadrant coordinate used by both schemes.
fn phi_to_tt(phi: f64) -> f64 {
    let mut phi = phi % TWOPI;
    if phi < 0.0 {
        phi += TWOPI;
    }
    // φ just below 2π can round to 2π after the shift.
    if phi >= TWOPI {
        phi = 0.0;
    }
    phi / HALF_PI
}

/// RING pixel containing colatitude `theta` and longitude `phi` (radians).
pub fn ang2pix_ring(nside: Nside, theta: f64, phi: f64) -> LssResult<u64> {
    check_angles(theta, phi)?;

    let n = nside.n();
    let z = libm::cos(theta);
    let za = z.abs();
    let tt = phi_to_tt(phi);

    let pix = if za <= 2.0 / 3.0 {
        let temp1 = n as f64 * (0.5 + tt);
        let temp2 = n as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;

        let ir = n + 1 + jp - jm;
        let kshift = 1 - (ir & 1);
        let ip = ((jp + jm - n + kshift + 1 + 8 * n) / 2).rem_euclid(4 * n);
        nside.ncap() + (ir - 1) * 4 * n + ip
    } else {
        let tp = tt - libm::floor(tt);
        let tmp = n as f64 * polar_distance(theta, za);
        let jp = (tp * tmp) as i64;
        let jm = ((1.0 - tp) * tmp) as i64;

        let ir = jp + jm + 1;
        let ip = ((tt * ir as f64) as i64).rem_euclid(4 * ir);
        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            nside.npix() as i64 - 2 * ir * (ir + 1) + ip
        }
    };
    Ok(pix as u64)
}

/// `sqrt(3 (1 − |z|))`, evaluated through sin θ near the poles where
/// `1 − |z|` loses precision.
fn polar_distance(theta: f64, za: f64) -> f64 {
    if za > 0.99 {
        let s = libm::sin(theta);
        s / libm::sqrt((1.0 + za) / 3.0)
    } else {
        libm::sqrt(3.0 * (1.0 - za))
    }
}

/// NEST pixel containing colatitude `theta` and longitude `phi` (radians).
pub fn ang2pix_nest(nside: Nside, theta: f64, phi: f64) -> LssResult<u64> {
    check_angles(theta, phi)?;

    let n = nside.n();
    let order = nside.order();
    let z = libm::cos(theta);
    let za = z.abs();
    let tt = phi_to_tt(phi);

    let (ix, iy, face) = if za <= 2.0 / 3.0 {
        let temp1 = n as f64 * (0.5 + tt);
        let temp2 = n as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;
        let face = equatorial_face(jp >> order, jm >> order);
        (jm & (n - 1), n - (jp & (n - 1)) - 1, face)
    } else {
        let ntt = (tt as i64).min(3);
        let tp = tt - ntt as f64;
        let tmp = n as f64 * polar_distance(theta, za);
        let jp = ((tp * tmp) as i64).min(n - 1);
        let jm = (((1.0 - tp) * tmp) as i64).min(n - 1);
        if z >= 0.0 {
            (n - jm - 1, n - jp - 1, ntt)
        } else {
            (jp, jm, ntt + 8)
        }
    };
    Ok(xyf2nest(nside, ix, iy, face) as u64)
}

/// Centre `(θ, φ)` of a RING pixel.
pub fn pix2ang_ring(nside: Nside, pix: u64) -> LssResult<(f64, f64)> {
    let pix = nside.check_pixel(pix)?;
    let n = nside.n();
    let npix = nside.npix() as i64;
    let ncap = nside.ncap();
    let fact = 1.0 / (3.0 * (n * n) as f64);

    let (z, phi) = if pix < ncap {
        let iring = (1 + isqrt(1 + 2 * pix)) >> 1;
        let iphi = (pix + 1) - 2 * iring * (iring - 1);
        (
            1.0 - (iring * iring) as f64 * fact,
            (iphi as f64 - 0.5) * HALF_PI / iring as f64,
        )
    } else if pix < npix - ncap {
        let ip = pix - ncap;
        let iring = ip / (4 * n) + n;
        let iphi = ip % (4 * n) + 1;
        let fodd = if (iring + n) & 1 == 1 { 1.0 } else { 0.5 };
        (
            (2 * n - iring) as f64 * 2.0 / (3 * n) as f64,
            (iphi as f64 - fodd) * HALF_PI / n as f64,
        )
    } else {
        let ip = npix - pix;
        let iring = (1 + isqrt(2 * ip - 1)) >> 1;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        (
            -1.0 + (iring * iring) as f64 * fact,
            (iphi as f64 - 0.5) * HALF_PI / iring as f64,
        )
    };
    Ok((libm::acos(z), phi))
}

/// Converts a NEST index to RING.
pub fn nest2ring(nside: Nside, pix: u64) -> LssResult<u64> {
    let pix = nside.check_pixel(pix)?;
    let (ix, iy, face) = nest2xyf(nside, pix);
    Ok(xyf2ring(nside, ix, iy, face) as u64)
}

/// Converts a RING index to NEST.
pub fn ring2nest(nside: Nside, pix: u64) -> LssResult<u64> {
    let pix = nside.check_pixel(pix)?;
    let (ix, iy, face) = ring2xyf(nside, pix);
    Ok(xyf2nest(nside, ix, iy, face) as u64)
}

fn equatorial_face(ifp: i64, ifm: i64) -> i64 {
    if ifp == ifm {
        ifp | 4
    } else if ifp < ifm {
        ifp
    } else {
        ifm + 8
    }
}

fn isqrt(v: i64) -> i64 {
    let mut r = (v as f64).sqrt() as i64;
    while r * r > v {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    r
}

/// Interleaves the bits of `x` (even positions) and `y` (odd positions).
fn spread_bits(x: i64, y: i64, order: u32) -> i64 {
    let mut result = 0;
    for i in 0..order {
        result |= ((x >> i) & 1) << (2 * i);
        result |= ((y >> i) & 1) << (2 * i + 1);
    }
    result
}

fn compact_bits(v: i64, order: u32) -> i64 {
    let mut result = 0;
    for i in 0..order {
        result |= ((v >> (2 * i)) & 1) << i;
    }
    result
}

fn xyf2nest(nside: Nside, ix: i64, iy: i64, face: i64) -> i64 {
    face * nside.n() * nside.n() + spread_bits(ix, iy, nside.order())
}

fn nest2xyf(nside: Nside, pix: i64) -> (i64, i64, i64) {
    let npface = nside.n() * nside.n();
    let face = pix / npface;
    let p = pix % npface;
    let order = nside.order();
    (compact_bits(p, order), compact_bits(p >> 1, order), face)
}

fn xyf2ring(nside: Nside, ix: i64, iy: i64, face: i64) -> i64 {
    let n = nside.n();
    let nl4 = 4 * n;
    let face = face as usize;
    let jr = JRLL[face] * n - ix - iy - 1;

    let (nr, n_before, kshift) = if jr < n {
        (jr, 2 * jr * (jr - 1), 0)
    } else if jr > 3 * n {
        let nr = nl4 - jr;
        (nr, nside.npix() as i64 - 2 * (nr + 1) * nr, 0)
    } else {
        (n, nside.ncap() + (jr - n) * nl4, (jr - n) & 1)
    };

    let mut jp = (JPLL[face] * nr + ix - iy + 1 + kshift) / 2;
    if jp > nl4 {
        jp -= nl4;
    } else if jp < 1 {
        jp += nl4;
    }
    n_before + jp - 1
}

fn ring2xyf(nside: Nside, pix: i64) -> (i64, i64, i64) {
    let n = nside.n();
    let nl2 = 2 * n;
    let npix = nside.npix() as i64;
    let ncap = nside.ncap();

    let (iring, iphi, kshift, nr, face) = if pix < ncap {
        let iring = (1 + isqrt(1 + 2 * pix)) >> 1;
        let iphi = (pix + 1) - 2 * iring * (iring - 1);
        (iring, iphi, 0, iring, (iphi - 1) / iring)
    } else if pix < npix - ncap {
        let ip = pix - ncap;
        let tmp = ip / (4 * n);
        let iring = tmp + n;
        let iphi = ip - tmp * 4 * n + 1;
        let kshift = (iring + n) & 1;
        let ire = tmp + 1;
        let irm = nl2 + 1 - tmp;
        let ifm = (iphi - ire / 2 + n - 1) / n;
        let ifp = (iphi - irm / 2 + n - 1) / n;
        (iring, iphi, kshift, n, equatorial_face(ifp, ifm))
    } else {
        let ip = npix - pix;
        let iring = (1 + isqrt(2 * ip - 1)) >> 1;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        (2 * nl2 - iring, iphi, 0, iring, (iphi - 1) / iring + 8)
    };

    let face_index = face as usize;
    let irt = iring - JRLL[face_index] * n + 1;
    let mut ipt = 2 * iphi - JPLL[face_index] * nr - kshift - 1;
    if ipt >= nl2 {
        ipt -= 8 * n;
    }
    ((ipt - irt) >> 1, (-ipt - irt) >> 1, face)
}
