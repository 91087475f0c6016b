use std::io::Write;

use lss_cosmo::{Cosmology, CosmologyParams, IswTracer};
use tempfile::NamedTempFile;

#[test]
fn test_tracer_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "cosmology:\n  omega_c: 0.26\n  omega_b: 0.049\n  h: 0.677\n  n_s: 0.967\n  sigma8: 0.81"
    )
    .unwrap();

    let params = CosmologyParams::from_config(file.path(), "cosmology").unwrap();
    assert_eq!(params.sigma8, Some(0.81));

    let cosmo = Cosmology::new(params).unwrap();
    let tracer = IswTracer::with_defaults(&cosmo).unwrap();
    let (chi, weight) = tracer.kernel();

    assert_eq!(chi.len(), weight.len());
    assert_eq!(weight[0], 0.0);
    assert!(weight[1..].iter().all(|w| w.is_finite() && *w > 0.0));
    // χ² growth dominates close to the observer
    assert!(weight[10] > weight[1]);
}

#[test]
fn test_incomplete_cosmology_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "cosmology:\n  omega_c: 0.26\n  omega_b: 0.049\n  n_s: 0.967").unwrap();
    assert!(CosmologyParams::from_config(file.path(), "cosmology").is_err());
}
