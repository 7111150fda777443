//! Notification Integration Tests
//!
//! Urgent alerts fanned out to mock WhatsApp and email APIs.

use smart_tagging::models::settings::{AppConfig, NotificationSettings};
use smart_tagging::services::notification::{
    DeliveryStatus, NotificationChannelType, NotificationDispatcher,
};
use smart_tagging::{AnalysisResult, SentimentLevel, SmartTag, TenantContacts};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{in_memory_state, offline_config, reservation};

fn settings_for(server: &MockServer) -> NotificationSettings {
    NotificationSettings {
        whatsapp_api_url: Some(format!("{}/whatsapp/messages", server.uri())),
        whatsapp_api_token: Some("wa-token".to_string()),
        email_api_url: Some(format!("{}/email/send", server.uri())),
        email_api_token: Some("mail-token".to_string()),
        timeout_secs: 2,
        max_retries: 1,
        retry_delay_ms: 1,
        ..Default::default()
    }
}

fn staff_contacts() -> TenantContacts {
    TenantContacts {
        staff_phone: Some("+15557654321".to_string()),
        staff_email: Some("kitchen@bistro.example".to_string()),
    }
}

fn urgent_result() -> AnalysisResult {
    AnalysisResult::new(
        [SmartTag::Allergy],
        SentimentLevel::Urgent,
        0.9,
        "Severe shellfish allergy",
        Some("Detected urgent keyword: 'anaphylaxis'".to_string()),
    )
}

fn status_of(
    report: &smart_tagging::services::notification::DispatchReport,
    channel: NotificationChannelType,
) -> Option<DeliveryStatus> {
    report
        .attempts
        .iter()
        .find(|a| a.channel == channel)
        .map(|a| a.status)
}

#[tokio::test]
async fn test_all_channels_deliver() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/whatsapp/messages"))
        .and(header("Authorization", "Bearer wa-token"))
        .and(body_partial_json(serde_json::json!({"to": "+15557654321"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/email/send"))
        .and(header("Authorization", "Bearer mail-token"))
        .and(body_partial_json(serde_json::json!({"to": ["kitchen@bistro.example"]})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = NotificationDispatcher::from_settings(&settings_for(&server));
    let report = dispatcher
        .dispatch(Uuid::new_v4(), Uuid::new_v4(), &urgent_result(), &staff_contacts())
        .await;

    assert!(report.triggered);
    assert_eq!(report.attempts.len(), 3);
    assert_eq!(report.delivered_count(), 3);
}

#[tokio::test]
async fn test_failing_channel_does_not_block_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/whatsapp/messages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/email/send"))
        .respond_with(ResponseTemplate::new(500).set_body_string("mailer down"))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = NotificationDispatcher::from_settings(&settings_for(&server));
    let report = dispatcher
        .dispatch(Uuid::new_v4(), Uuid::new_v4(), &urgent_result(), &staff_contacts())
        .await;

    assert!(report.triggered);
    assert_eq!(
        status_of(&report, NotificationChannelType::InSystem),
        Some(DeliveryStatus::Sent)
    );
    assert_eq!(
        status_of(&report, NotificationChannelType::WhatsApp),
        Some(DeliveryStatus::Sent)
    );
    let email = report
        .attempts
        .iter()
        .find(|a| a.channel == NotificationChannelType::Email)
        .unwrap();
    assert_eq!(email.status, DeliveryStatus::Failed);
    assert_eq!(email.attempts, 2);
    assert!(email.reason.is_some());
}

#[tokio::test]
async fn test_missing_contacts_only_fire_in_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = NotificationDispatcher::from_settings(&settings_for(&server));
    let report = dispatcher
        .dispatch(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &urgent_result(),
            &TenantContacts::default(),
        )
        .await;

    assert!(report.triggered);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(report.attempts[0].channel, NotificationChannelType::InSystem);
}

#[tokio::test]
async fn test_urgent_analysis_alerts_tenant_staff() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/whatsapp/messages"))
        .and(body_partial_json(serde_json::json!({"to": "+15557654321"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/email/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig {
        notifications: settings_for(&server),
        ..offline_config()
    };
    let state = in_memory_state(config);
    let tenant = Uuid::new_v4();
    state
        .set_tenant_contacts(tenant, staff_contacts())
        .await
        .unwrap();

    let response = state
        .analyze(&reservation(tenant, None, "Life-threatening peanut allergy", ""))
        .await
        .unwrap();

    assert!(response.notification_triggered);
    assert!(response.smart_tags.is_urgent());
}

#[tokio::test]
async fn test_non_urgent_analysis_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = AppConfig {
        notifications: settings_for(&server),
        ..offline_config()
    };
    let state = in_memory_state(config);
    let tenant = Uuid::new_v4();
    state
        .set_tenant_contacts(tenant, staff_contacts())
        .await
        .unwrap();

    let response = state
        .analyze(&reservation(tenant, None, "Mild lactose intolerance", ""))
        .await
        .unwrap();

    assert!(!response.notification_triggered);
    assert!(response.smart_tags.has_tag(SmartTag::Allergy));
}

#[tokio::test]
async fn test_auth_rejection_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/whatsapp/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/email/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings_for(&server);
    settings.max_retries = 3;
    let dispatcher = NotificationDispatcher::from_settings(&settings);
    let report = dispatcher
        .dispatch(Uuid::new_v4(), Uuid::new_v4(), &urgent_result(), &staff_contacts())
        .await;

    let whatsapp = report
        .attempts
        .iter()
        .find(|a| a.channel == NotificationChannelType::WhatsApp)
        .unwrap();
    assert_eq!(whatsapp.status, DeliveryStatus::Failed);
    assert_eq!(whatsapp.attempts, 1);
    assert_eq!(
        status_of(&report, NotificationChannelType::Email),
        Some(DeliveryStatus::Sent)
    );
}
