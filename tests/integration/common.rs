//! Shared test fixtures.

use smart_tagging::models::reservation::ReservationInput;
use smart_tagging::models::settings::AppConfig;
use smart_tagging::storage::Database;
use smart_tagging::AppState;
use uuid::Uuid;

/// Offline config: no API key, no external channels, no retry delay.
pub fn offline_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.provider.api_key = None;
    config.provider.retry_delay_ms = 0;
    config
}

pub fn in_memory_state(config: AppConfig) -> AppState {
    AppState::with_database(config, Database::new_in_memory().unwrap()).unwrap()
}

pub fn reservation(
    tenant_id: Uuid,
    customer_id: Option<Uuid>,
    special: &str,
    dietary: &str,
) -> ReservationInput {
    ReservationInput::new(tenant_id, customer_id, Uuid::new_v4(), special, dietary)
}
