//! End to end: synthetic NetCDF run on disk through the store.

use std::fs;

use profile_store::{ExtractAndCacheStore, NetCdfProfileSource, Run, StoreConfig, StoreError};
use test_utils::{
    assert_approx_eq, require_test_file, scenario, scenario_run, temp_test_dir,
    write_model_output, SyntheticRun,
};

fn store_for(dir: &std::path::Path) -> ExtractAndCacheStore<NetCdfProfileSource> {
    let config = StoreConfig::with_dirs(dir.join("ncdf"), dir.join("out"));
    let source = NetCdfProfileSource::from_config(&config);
    ExtractAndCacheStore::new(config, source).unwrap()
}

#[test]
fn test_run1_nc_scenario() {
    let dir = temp_test_dir();
    let store = store_for(dir.path());
    fs::create_dir_all(dir.path().join("ncdf")).unwrap();
    write_model_output(store.source_path(&Run::numbered(1)), &scenario_run()).unwrap();

    let profile = store.get_profile(&Run::numbered(1), "nc", false).unwrap();
    assert_eq!(profile.coordinates(), scenario::HEIGHTS.to_vec());
    assert_eq!(profile.values(), scenario::NC_MEANS.to_vec());

    let text = fs::read_to_string(store.cache_path(&Run::numbered(1), "nc")).unwrap();
    assert_eq!(text, scenario::RECORD);
}

#[test]
fn test_qc_is_reported_in_grams_per_kilogram() {
    let dir = temp_test_dir();
    let store = store_for(dir.path());
    fs::create_dir_all(dir.path().join("ncdf")).unwrap();

    let run = SyntheticRun::with_profile(vec![500.0, 1500.0], 30, 15, &[0.0005, 0.002]);
    write_model_output(store.source_path(&Run::numbered(2)), &run).unwrap();

    let profile = store.compute(&Run::numbered(2), "qc").unwrap();
    assert_approx_eq!(profile.values()[0], 0.5, 1e-12);
    assert_approx_eq!(profile.values()[1], 2.0, 1e-12);
}

#[test]
fn test_missing_source_is_data_access() {
    let dir = temp_test_dir();
    let store = store_for(dir.path());

    let err = store.get_profile(&Run::numbered(9), "nc", false).unwrap_err();
    assert!(matches!(err, StoreError::DataAccess { .. }));
}

#[test]
fn test_index_beyond_file_is_data_access() {
    let dir = temp_test_dir();
    let store = store_for(dir.path());
    fs::create_dir_all(dir.path().join("ncdf")).unwrap();

    // only 10 tracers; nc sits at 14
    let run = SyntheticRun::predictable(2, 2, 3, 10);
    write_model_output(store.source_path(&Run::numbered(1)), &run).unwrap();

    let err = store.compute(&Run::numbered(1), "nc").unwrap_err();
    assert!(matches!(err, StoreError::DataAccess { .. }));
}

#[test]
fn test_real_run_if_present() {
    let path = require_test_file!("run1.nc");
    let data_dir = path.parent().unwrap().to_path_buf();
    let cache = temp_test_dir();

    let config = StoreConfig::with_dirs(data_dir, cache.path());
    let source = NetCdfProfileSource::from_config(&config);
    let store = ExtractAndCacheStore::new(config, source).unwrap();

    let computed = store.get_profile(&Run::numbered(1), "nc", false).unwrap();
    let loaded = store.load(&Run::numbered(1), "nc").unwrap();
    assert!(loaded.approx_eq(&computed, 1e-9));
}
