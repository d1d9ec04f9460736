// ABOUTME: Verifies build_app_state wires a usable AppState from a default configuration
// ABOUTME: Exercises the ESS-absent path; the ESS-present path is covered by meridian-ess's own adapter tests

use meridian_cli::bootstrap::build_app_state;
use meridian_config::MeridianConfig;

#[test]
fn build_app_state_succeeds_with_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = MeridianConfig::default();

    let state = build_app_state(&config, dir.path().to_path_buf()).unwrap();

    assert_eq!(state.config.bind_addr, "127.0.0.1:8080");
}

#[test]
fn build_app_state_enables_ess_only_when_base_url_is_set() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MeridianConfig::default();
    config.ess.base_url = "https://ess.example.internal".to_string();

    // Construction alone must not attempt any network call; EssAdapter::new
    // only stores the client configuration.
    let state = build_app_state(&config, dir.path().to_path_buf()).unwrap();
    drop(state);
}

#[test]
fn build_app_state_fails_when_data_dir_is_unwritable() {
    let config = MeridianConfig::default();
    let bogus = std::path::PathBuf::from("/proc/nonexistent-meridian-data-dir/nested");

    let result = build_app_state(&config, bogus);

    assert!(result.is_err());
}
