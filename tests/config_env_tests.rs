// Environment layer of configuration loading
// Kept in its own test binary: variables set here are process-wide

use fake_service_broker::{BrokerMode, FakeBrokerConfig};
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_environment_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake-broker.toml");
    fs::write(
        &path,
        "[broker]\nmode = \"synchronous\"\ninstance_limit = 7\ndashboard_url = \"http://file\"\n",
    )
    .unwrap();

    env::set_var("FAKE_BROKER__BROKER__MODE", "async-only");
    env::set_var("FAKE_BROKER__BROKER__INSTANCE_LIMIT", "2");
    let loaded = FakeBrokerConfig::load(Some(&path));
    env::remove_var("FAKE_BROKER__BROKER__MODE");
    env::remove_var("FAKE_BROKER__BROKER__INSTANCE_LIMIT");

    let config = loaded.unwrap();
    assert_eq!(config.broker.mode, BrokerMode::AsyncOnly);
    assert_eq!(config.broker.instance_limit, Some(2));
    // Keys the environment does not name still come from the file
    assert_eq!(config.broker.dashboard_url.as_deref(), Some("http://file"));
}
