//! Smart Tagging - reservation note analysis
//!
//! Classifies free-text reservation notes into a fixed tag vocabulary with a
//! sentiment level, escalates safety-critical notes to `Urgent`, merges the
//! result into the customer's profile and alerts staff on urgent notes.
//! It includes:
//! - Business logic services (classification, urgency, notification, persistence)
//! - Storage layer (SQLite, JSON config)
//! - Data models and utilities

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::reservation::{AnalyzeResponse, ReservationInput, TenantContacts};
pub use models::response::*;
pub use models::settings::AppConfig;
pub use smart_tagging_core::{AnalysisResult, SentimentLevel, SmartTag};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
