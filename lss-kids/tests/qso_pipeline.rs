use std::fs;

use lss_catalog::{get_redshift_distribution, Column, ColumnData, Table};
use lss_kids::{get_kids_qso_map, get_kids_qsos, KIDS_QSO_CATALOG};
use lss_maps::{get_masked_overdensity_map, get_shot_noise, pix2ang_ring, Nside};

const RA_RANGE: (f64, f64) = (30.0, 90.0);
const DEC_RANGE: (f64, f64) = (-5.0, 40.0);

/// Quasar candidates on a regular grid, uniform in area over a patch.
fn patch_catalog(n_ra: usize, n_dec: usize) -> Table {
    let (z_lo, z_hi) = (DEC_RANGE.0.to_radians().sin(), DEC_RANGE.1.to_radians().sin());
    let mut ra = Vec::new();
    let mut dec = Vec::new();
    for i in 0..n_ra {
        for j in 0..n_dec {
            ra.push(RA_RANGE.0 + (RA_RANGE.1 - RA_RANGE.0) * (i as f64 + 0.5) / n_ra as f64);
            let z = z_lo + (z_hi - z_lo) * (j as f64 + 0.5) / n_dec as f64;
            dec.push(z.asin().to_degrees());
        }
    }
    let n = ra.len();
    // every fourth row fails the magnitude cut
    let mag = (0..n).map(|i| if i % 4 == 0 { 24.0 } else { 21.0 }).collect();
    let redshift = (0..n).map(|i| 0.5 + 2.0 * (i % 100) as f64 / 100.0).collect();

    Table::new(vec![
        Column::new("RAJ2000", ColumnData::Float(ra)),
        Column::new("DECJ2000", ColumnData::Float(dec)),
        Column::new("MAG_GAAP_r", ColumnData::Float(mag)),
        Column::new("QSO_PHOTO", ColumnData::Float(vec![0.99; n])),
        Column::new("Z_PHOTO_QSO", ColumnData::Float(redshift)),
        Column::new("IMAFLAGS_ISO", ColumnData::Int(vec![0; n])),
    ])
    .unwrap()
}

fn inside_patch(ra: f64, dec: f64, margin: f64) -> bool {
    ra > RA_RANGE.0 + margin
        && ra < RA_RANGE.1 - margin
        && dec > DEC_RANGE.0 + margin
        && dec < DEC_RANGE.1 - margin
}

#[test]
fn test_footprint_mask_and_overdensity() {
    let data_root = tempfile::tempdir().unwrap();
    let path = data_root.path().join(KIDS_QSO_CATALOG);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    patch_catalog(400, 300).write_fits(&path).unwrap();

    let qsos = get_kids_qsos(data_root.path()).unwrap();
    assert_eq!(qsos.num_rows(), 400 * 300 * 3 / 4);

    let nside = Nside::new(16).unwrap();
    let (counts, mask) = get_kids_qso_map(&qsos, nside).unwrap();
    assert_eq!(mask.len(), nside.npix());

    for pix in 0..nside.npix() {
        let (theta, phi) = pix2ang_ring(nside, pix as u64).unwrap();
        let (ra, dec) = (phi.to_degrees(), 90.0 - theta.to_degrees());
        let covered = mask.weights()[pix] == 1.0;

        // the footprint is exactly the set of pixels holding quasars
        assert_eq!(covered, counts.values()[pix] > 0.0, "pixel {}", pix);
        assert_eq!(counts.is_masked(pix), !covered);
        if inside_patch(ra, dec, 5.0) {
            assert!(covered, "pixel {} at ({}, {}) inside the patch", pix, ra, dec);
        }
        if !inside_patch(ra, dec, -5.0) {
            assert!(!covered, "pixel {} at ({}, {}) outside the patch", pix, ra, dec);
        }
    }

    let delta = get_masked_overdensity_map(&counts, &mask, None).unwrap();
    assert!(delta.mean().unwrap().abs() < 1e-12);

    let shot_noise = get_shot_noise(counts.values(), &mask).unwrap();
    let expected = 4.0 * std::f64::consts::PI * mask.sky_fraction() / qsos.num_rows() as f64;
    assert!((shot_noise - expected).abs() < 1e-12 * expected);

    let (z, n) = get_redshift_distribution(&qsos, 10, "Z_PHOTO_QSO").unwrap();
    assert_eq!(z.len(), 10);
    assert_eq!(n.iter().sum::<u64>() as usize, qsos.num_rows());
    assert_eq!(qsos.int_column("IMAFLAGS_ISO").unwrap().len(), qsos.num_rows());
}
