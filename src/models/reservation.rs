//! Reservation Models
//!
//! Inputs and outputs of the analyze operation, plus the stored profile,
//! history and tenant contact records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smart_tagging_core::AnalysisResult;
use uuid::Uuid;

use crate::utils::error::{AppError, AppResult};

/// Maximum length of the special request text, in characters
pub const MAX_SPECIAL_REQUEST_CHARS: usize = 2000;

/// Maximum length of the dietary preferences text, in characters
pub const MAX_DIETARY_PREFERENCES_CHARS: usize = 1000;

/// One reservation note submitted for analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationInput {
    pub tenant_id: Uuid,
    /// Absent for walk-ins; analysis then runs stateless
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub reservation_id: Uuid,
    #[serde(default)]
    pub special_request_text: String,
    #[serde(default)]
    pub dietary_preferences: String,
}

impl ReservationInput {
    pub fn new(
        tenant_id: Uuid,
        customer_id: Option<Uuid>,
        reservation_id: Uuid,
        special_request_text: impl Into<String>,
        dietary_preferences: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            customer_id,
            reservation_id,
            special_request_text: special_request_text.into(),
            dietary_preferences: dietary_preferences.into(),
        }
    }

    /// Reject input the pipeline must never see.
    pub fn validate(&self) -> AppResult<()> {
        if self.tenant_id.is_nil() {
            return Err(AppError::validation("tenant_id is required"));
        }
        if self.special_request_text.trim().is_empty()
            && self.dietary_preferences.trim().is_empty()
        {
            return Err(AppError::validation(
                "special_request_text or dietary_preferences must be provided",
            ));
        }
        if self.special_request_text.chars().count() > MAX_SPECIAL_REQUEST_CHARS {
            return Err(AppError::validation(format!(
                "special_request_text exceeds {} characters",
                MAX_SPECIAL_REQUEST_CHARS
            )));
        }
        if self.dietary_preferences.chars().count() > MAX_DIETARY_PREFERENCES_CHARS {
            return Err(AppError::validation(format!(
                "dietary_preferences exceeds {} characters",
                MAX_DIETARY_PREFERENCES_CHARS
            )));
        }
        Ok(())
    }
}

/// Result of the analyze operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub reservation_id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Option<Uuid>,
    /// The stored (merged) result, or the per-call result in stateless mode
    pub smart_tags: AnalysisResult,
    /// Urgency was detected and dispatch attempted
    pub notification_triggered: bool,
}

/// Stored customer record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Unique within the tenant
    pub phone: Option<String>,
    pub email: Option<String>,
    pub dietary_preferences: Option<String>,
    pub special_request_text: Option<String>,
    /// Latest merged analysis
    pub smart_tags: Option<AnalysisResult>,
    /// Bumped on every committed write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new customer profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub dietary_preferences: Option<String>,
    #[serde(default)]
    pub special_request_text: Option<String>,
}

impl NewCustomer {
    pub fn with_phone(phone: impl Into<String>) -> Self {
        Self {
            phone: Some(phone.into()),
            ..Default::default()
        }
    }
}

/// Immutable record of one analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisHistoryEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub reservation_id: Uuid,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

/// Per-tenant alert recipients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContacts {
    #[serde(default)]
    pub staff_phone: Option<String>,
    #[serde(default)]
    pub staff_email: Option<String>,
}

impl TenantContacts {
    pub fn staff_phone(&self) -> Option<&str> {
        self.staff_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn staff_email(&self) -> Option<&str> {
        self.staff_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}
