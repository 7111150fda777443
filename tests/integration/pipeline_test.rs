//! Analyze Pipeline Integration Tests
//!
//! Runs the full pipeline with no provider configured, so every result comes
//! from the keyword classifier.

use smart_tagging::services::tagging::RULE_BASED_CONFIDENCE;
use smart_tagging::{AppError, SentimentLevel, SmartTag, TenantContacts};
use uuid::Uuid;

use crate::common::{in_memory_state, offline_config, reservation};

// ============================================================================
// Classification and urgency
// ============================================================================

#[tokio::test]
async fn test_allergy_with_epipen_is_urgent() {
    let state = in_memory_state(offline_config());
    let tenant = Uuid::new_v4();
    let customer = Uuid::new_v4();

    let response = state
        .analyze(&reservation(
            tenant,
            Some(customer),
            "Birthday celebration, severe nut allergy, carries EpiPen",
            "",
        ))
        .await
        .unwrap();

    let tags = &response.smart_tags;
    assert!(tags.has_tag(SmartTag::Birthday));
    assert!(tags.has_tag(SmartTag::Allergy));
    assert_eq!(tags.sentiment, SentimentLevel::Urgent);
    assert!(tags.urgent_reason.as_deref().unwrap().contains("epipen"));
    assert_eq!(tags.confidence, RULE_BASED_CONFIDENCE);
    assert!(response.notification_triggered);
}

#[tokio::test]
async fn test_anniversary_with_nut_allergy_scenario() {
    let state = in_memory_state(offline_config());
    let response = state
        .analyze(&reservation(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            "This is our anniversary dinner. My wife has a severe nut allergy \u{2014} she carries an epipen.",
            "Vegetarian, nut-free",
        ))
        .await
        .unwrap();

    let tags = &response.smart_tags;
    for tag in [SmartTag::Anniversary, SmartTag::DietaryRestriction, SmartTag::Allergy] {
        assert!(tags.has_tag(tag), "missing {}", tag);
    }
    assert_eq!(tags.sentiment, SentimentLevel::Urgent);
    assert!(tags.urgent_reason.as_deref().unwrap().contains("epipen"));
    assert!(response.notification_triggered);
}

#[tokio::test]
async fn test_benign_note_is_neutral() {
    let state = in_memory_state(offline_config());
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "Table by the window please", ""))
        .await
        .unwrap();

    assert!(response.smart_tags.tags.is_empty());
    assert_eq!(response.smart_tags.sentiment, SentimentLevel::Neutral);
    assert_eq!(response.smart_tags.confidence, RULE_BASED_CONFIDENCE);
    assert!(response.smart_tags.urgent_reason.is_none());
    assert!(!response.notification_triggered);
}

#[tokio::test]
async fn test_urgent_phrase_in_dietary_field_only() {
    let state = in_memory_state(offline_config());
    let response = state
        .analyze(&reservation(
            Uuid::new_v4(),
            None,
            "Anniversary dinner",
            "Anaphylaxis risk with shellfish",
        ))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::Anniversary));
    assert!(response.smart_tags.is_urgent());
    assert!(response
        .smart_tags
        .urgent_reason
        .as_deref()
        .unwrap()
        .contains("anaphylaxis"));
}

#[tokio::test]
async fn test_accented_keywords_match() {
    let state = in_memory_state(offline_config());
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "VÉGAN menu, EMERGÊNCY contact on file", ""))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::DietaryRestriction));
    assert!(response.smart_tags.is_urgent());
}

#[tokio::test]
async fn test_complaint_is_negative() {
    let state = in_memory_state(offline_config());
    let response = state
        .analyze(&reservation(
            Uuid::new_v4(),
            None,
            "Guest complained last visit, was a no-show before",
            "",
        ))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::NoShow));
    assert_eq!(response.smart_tags.sentiment, SentimentLevel::Negative);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_empty_notes_rejected() {
    let state = in_memory_state(offline_config());
    let err = state
        .analyze(&reservation(Uuid::new_v4(), None, "   ", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_oversized_note_rejected() {
    let state = in_memory_state(offline_config());
    let long = "a".repeat(2001);
    let err = state
        .analyze(&reservation(Uuid::new_v4(), None, &long, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// ============================================================================
// Profile and history
// ============================================================================

#[tokio::test]
async fn test_tags_accumulate_on_profile() {
    let state = in_memory_state(offline_config());
    let tenant = Uuid::new_v4();
    let customer = Uuid::new_v4();

    state
        .analyze(&reservation(tenant, Some(customer), "VIP guest", ""))
        .await
        .unwrap();
    let second = state
        .analyze(&reservation(tenant, Some(customer), "", "Strictly vegan"))
        .await
        .unwrap();

    assert!(second.smart_tags.has_tag(SmartTag::Vip));
    assert!(second.smart_tags.has_tag(SmartTag::DietaryRestriction));

    let stored = state
        .get_customer_tags(tenant, customer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tags, second.smart_tags.tags);

    let history = state.list_history(tenant, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].result.has_tag(SmartTag::DietaryRestriction));
    assert!(!history[0].result.has_tag(SmartTag::Vip));
}

#[tokio::test]
async fn test_stateless_analysis_writes_nothing() {
    let state = in_memory_state(offline_config());
    let tenant = Uuid::new_v4();

    state
        .analyze(&reservation(tenant, None, "Birthday party", ""))
        .await
        .unwrap();

    assert!(state.list_history(tenant, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_customer_tags_not_found() {
    let state = in_memory_state(offline_config());
    let err = state
        .get_customer_tags(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_tenant_contacts_round_trip_through_state() {
    let state = in_memory_state(offline_config());
    let tenant = Uuid::new_v4();
    let contacts = TenantContacts {
        staff_phone: Some("+15551234567".to_string()),
        staff_email: None,
    };

    state.set_tenant_contacts(tenant, contacts.clone()).await.unwrap();
    assert_eq!(state.get_tenant_contacts(tenant).await.unwrap(), contacts);
    assert_eq!(
        state.get_tenant_contacts(Uuid::new_v4()).await.unwrap(),
        TenantContacts::default()
    );
}

#[tokio::test]
async fn test_health_reports_fallback_mode() {
    let state = in_memory_state(offline_config());
    let health = state.health().await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "smart-tagging");
    assert!(health.database);
    assert!(!health.provider_configured);
}
