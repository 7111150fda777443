//! Services
//!
//! Business logic of the tagging pipeline.

pub mod analyze;
pub mod notification;
pub mod tagging;
pub mod unit_of_work;
pub mod urgency;

pub use analyze::AnalyzeOrchestrator;
pub use notification::{NotificationDispatcher, NotificationChannel};
pub use tagging::{Classifier, ClassificationEngine, ProviderClassifier, RuleBasedClassifier};
pub use unit_of_work::PersistenceCoordinator;
pub use urgency::{detect_urgent_keyword, override_urgency};
