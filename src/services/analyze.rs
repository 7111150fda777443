//! Analyze Orchestrator
//!
//! Runs the tagging pipeline in a fixed order: classify, override urgency,
//! persist, then alert. Persistence sees the overridden sentiment and alerts
//! use the stored result, so history and alerts always agree.

use std::sync::Arc;

use smart_tagging_core::AnalysisResult;
use tracing::{info, warn};
use uuid::Uuid;

use super::notification::NotificationDispatcher;
use super::tagging::ClassificationEngine;
use super::unit_of_work::PersistenceCoordinator;
use super::urgency::override_reservation;
use crate::models::reservation::{AnalyzeResponse, ReservationInput, TenantContacts};
use crate::models::response::HealthResponse;
use crate::utils::error::AppResult;

pub struct AnalyzeOrchestrator {
    engine: ClassificationEngine,
    persistence: Arc<PersistenceCoordinator>,
    notifier: NotificationDispatcher,
}

impl AnalyzeOrchestrator {
    pub fn new(
        engine: ClassificationEngine,
        persistence: Arc<PersistenceCoordinator>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            engine,
            persistence,
            notifier,
        }
    }

    pub fn persistence(&self) -> &Arc<PersistenceCoordinator> {
        &self.persistence
    }

    /// Analyze one reservation note.
    ///
    /// Provider and notification failures never fail the call. Persistence
    /// failures do, and then no alert is sent. Without a `customer_id` nothing
    /// is stored and the per-call result is returned.
    pub async fn analyze(&self, input: &ReservationInput) -> AppResult<AnalyzeResponse> {
        input.validate()?;

        let classification = self
            .engine
            .classify(&input.special_request_text, &input.dietary_preferences)
            .await;

        let result = override_reservation(
            &input.special_request_text,
            &input.dietary_preferences,
            classification.result,
        );

        let smart_tags = match input.customer_id {
            Some(customer_id) => {
                self.persistence
                    .commit(input.tenant_id, customer_id, input.reservation_id, &result)
                    .await?
            }
            None => result,
        };

        let notification_triggered = if smart_tags.is_urgent() {
            self.alert(input.tenant_id, input.reservation_id, &smart_tags)
                .await
        } else {
            false
        };

        info!(
            tenant_id = %input.tenant_id,
            reservation_id = %input.reservation_id,
            source = %classification.source,
            sentiment = %smart_tags.sentiment,
            tags = %smart_tags.tag_list(),
            notification_triggered,
            "Reservation analyzed"
        );

        Ok(AnalyzeResponse {
            reservation_id: input.reservation_id,
            tenant_id: input.tenant_id,
            customer_id: input.customer_id,
            smart_tags,
            notification_triggered,
        })
    }

    /// Currently stored tags; `NotFound` for an unknown customer, `None` when
    /// the customer has never been analyzed.
    pub async fn get_customer_tags(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<AnalysisResult>> {
        self.persistence.customer_tags(tenant_id, customer_id).await
    }

    pub async fn health(&self) -> HealthResponse {
        let db = self.persistence.database().clone();
        let database = tokio::task::spawn_blocking(move || db.is_healthy())
            .await
            .unwrap_or(false);

        let mut health = HealthResponse {
            database,
            provider_configured: self.engine.provider_available(),
            provider_reachable: self.engine.provider_reachable().await,
            ..Default::default()
        };
        // An unreachable provider leaves only the keyword fallback
        if !health.database || health.provider_reachable == Some(false) {
            health.status = "degraded".to_string();
        }
        health
    }

    async fn alert(&self, tenant_id: Uuid, reservation_id: Uuid, result: &AnalysisResult) -> bool {
        // Missing contacts only narrow the channel set; the in-system alert still fires.
        let contacts = match self.persistence.tenant_contacts(tenant_id).await {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(
                    tenant_id = %tenant_id,
                    error = %e,
                    "Could not load tenant contacts"
                );
                TenantContacts::default()
            }
        };

        self.notifier
            .dispatch(tenant_id, reservation_id, result, &contacts)
            .await
            .triggered
    }
}
