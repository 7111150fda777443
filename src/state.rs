//! Application State
//!
//! Composition root: builds the database, classifier, dispatcher and
//! orchestrator from an [`AppConfig`].

use std::path::PathBuf;
use std::sync::Arc;

use smart_tagging_core::AnalysisResult;
use smart_tagging_llm::OpenAIProvider;
use uuid::Uuid;

use crate::models::reservation::{
    AnalysisHistoryEntry, AnalyzeResponse, CustomerProfile, NewCustomer, ReservationInput,
    TenantContacts,
};
use crate::models::response::HealthResponse;
use crate::models::settings::AppConfig;
use crate::services::tagging::{ClassificationEngine, ProviderClassifier, RetryPolicy};
use crate::services::{AnalyzeOrchestrator, NotificationDispatcher, PersistenceCoordinator};
use crate::storage::Database;
use crate::utils::error::AppResult;

/// Application state shared by every caller
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    orchestrator: Arc<AnalyzeOrchestrator>,
}

impl AppState {
    /// Open the configured database (or the default location) and wire services.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let db = match config.persistence.database_path.as_deref() {
            Some(path) => Database::open(&PathBuf::from(path))?,
            None => Database::new()?,
        };
        Self::with_database(config, db)
    }

    /// Wire services over an existing database.
    pub fn with_database(config: AppConfig, db: Database) -> AppResult<Self> {
        config.validate().map_err(crate::utils::error::AppError::config)?;

        let engine = Self::build_engine(&config);
        let persistence = Arc::new(PersistenceCoordinator::new(
            db,
            config.persistence.max_commit_attempts,
        ));
        let notifier = NotificationDispatcher::from_settings(&config.notifications);

        tracing::debug!(
            provider = %config.provider.provider,
            model = %config.provider.model,
            provider_configured = config.provider.is_configured(),
            "Smart tagging services initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            orchestrator: Arc::new(AnalyzeOrchestrator::new(engine, persistence, notifier)),
        })
    }

    fn build_engine(config: &AppConfig) -> ClassificationEngine {
        let settings = &config.provider;
        let provider = Arc::new(OpenAIProvider::new(settings.to_provider_config()));
        let classifier =
            ProviderClassifier::new(provider, RetryPolicy::from(settings), settings.enabled);
        ClassificationEngine::new(Arc::new(classifier))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Provider enabled with credentials. Makes no network call.
    pub fn provider_configured(&self) -> bool {
        self.config.provider.is_configured()
    }

    pub fn orchestrator(&self) -> &Arc<AnalyzeOrchestrator> {
        &self.orchestrator
    }

    pub async fn analyze(&self, input: &ReservationInput) -> AppResult<AnalyzeResponse> {
        self.orchestrator.analyze(input).await
    }

    pub async fn get_customer_tags(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<AnalysisResult>> {
        self.orchestrator
            .get_customer_tags(tenant_id, customer_id)
            .await
    }

    pub async fn create_customer(
        &self,
        tenant_id: Uuid,
        customer: NewCustomer,
    ) -> AppResult<CustomerProfile> {
        self.orchestrator
            .persistence()
            .create_customer(tenant_id, customer)
            .await
    }

    pub async fn get_customer_by_phone(
        &self,
        tenant_id: Uuid,
        phone: impl Into<String>,
    ) -> AppResult<Option<CustomerProfile>> {
        self.orchestrator
            .persistence()
            .get_customer_by_phone(tenant_id, phone.into())
            .await
    }

    pub async fn set_tenant_contacts(
        &self,
        tenant_id: Uuid,
        contacts: TenantContacts,
    ) -> AppResult<()> {
        self.orchestrator
            .persistence()
            .set_tenant_contacts(tenant_id, contacts)
            .await
    }

    pub async fn get_tenant_contacts(&self, tenant_id: Uuid) -> AppResult<TenantContacts> {
        self.orchestrator.persistence().tenant_contacts(tenant_id).await
    }

    pub async fn list_history(
        &self,
        tenant_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<AnalysisHistoryEntry>> {
        self.orchestrator
            .persistence()
            .list_history(tenant_id, limit)
            .await
    }

    pub async fn health(&self) -> HealthResponse {
        self.orchestrator.health().await
    }
}
