//! Configuration Integration Tests
//!
//! Config file plus environment overrides feeding a running state.

use std::io::Write;

use smart_tagging::storage::ConfigService;
use smart_tagging::AppState;
use uuid::Uuid;

use crate::common::reservation;

#[tokio::test]
async fn test_state_built_from_config_file_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let db_path = dir.path().join("data").join("tags.db");

    let mut file = std::fs::File::create(&config_path).unwrap();
    file.write_all(br#"{"provider": {"enabled": true, "retry_delay_ms": 0}, "debug": false}"#)
        .unwrap();

    let db_override = db_path.to_string_lossy().into_owned();
    let service = ConfigService::from_path_with_env(&config_path, |key| match key {
        "SMART_TAGGING_DATABASE_PATH" => Some(db_override.clone()),
        "SMART_TAGGING_DEBUG" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();

    let config = service.into_config();
    assert!(config.debug);
    assert!(config.provider.api_key.is_none());

    let state = AppState::from_config(config).unwrap();
    assert!(db_path.exists());

    let health = state.health().await;
    assert!(health.database);
    assert!(!health.provider_configured);

    let tenant = Uuid::new_v4();
    let customer = Uuid::new_v4();
    state
        .analyze(&reservation(tenant, Some(customer), "VIP", ""))
        .await
        .unwrap();
    assert!(state
        .get_customer_tags(tenant, customer)
        .await
        .unwrap()
        .is_some());
}

#[test]
fn test_api_key_from_env_marks_provider_configured() {
    let dir = tempfile::tempdir().unwrap();
    let service = ConfigService::from_path_with_env(dir.path().join("config.json"), |key| {
        (key == "SMART_TAGGING_API_KEY").then(|| "gsk-from-env".to_string())
    })
    .unwrap();

    assert!(service.get_config().provider.is_configured());
}
