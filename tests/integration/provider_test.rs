//! AI Provider Integration Tests
//!
//! Drives the pipeline against a mock OpenAI-compatible endpoint.

use smart_tagging::models::settings::AppConfig;
use smart_tagging::services::tagging::RULE_BASED_CONFIDENCE;
use smart_tagging::{SentimentLevel, SmartTag};
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{in_memory_state, offline_config, reservation};

fn provider_config(server: &MockServer) -> AppConfig {
    let mut config = offline_config();
    config.provider.api_key = Some("gsk-test".to_string());
    config.provider.base_url = Some(format!("{}/openai/v1/chat/completions", server.uri()));
    config.provider.max_retries = 1;
    config
}

fn completion(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "model": "llama-3.1-70b-versatile",
        "choices": [{
            "message": {"role": "assistant", "content": content.to_string()},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 40}
    }))
}

#[tokio::test]
async fn test_provider_result_used_when_available() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("Authorization", "Bearer gsk-test"))
        .respond_with(completion(serde_json::json!({
            "tags": ["VIP", "ANNIVERSARY"],
            "sentiment": "POSITIVE",
            "confidence": 0.92,
            "summary": "Regular VIP celebrating an anniversary"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = in_memory_state(provider_config(&server));
    assert!(state.provider_configured());

    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "VIP anniversary dinner", ""))
        .await
        .unwrap();

    let tags = &response.smart_tags;
    assert!(tags.has_tag(SmartTag::Vip));
    assert!(tags.has_tag(SmartTag::Anniversary));
    assert_eq!(tags.sentiment, SentimentLevel::Positive);
    assert!((tags.confidence - 0.92).abs() < f64::EPSILON);
    assert_eq!(tags.summary, "Regular VIP celebrating an anniversary");
    assert!(!response.notification_triggered);
}

#[tokio::test]
async fn test_keyword_override_beats_provider_sentiment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(serde_json::json!({
            "tags": ["ALLERGY"],
            "sentiment": "POSITIVE",
            "confidence": 0.8,
            "summary": "Guest with an allergy"
        })))
        .mount(&server)
        .await;

    let state = in_memory_state(provider_config(&server));
    let response = state
        .analyze(&reservation(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            "Peanut allergy, will bring an epi-pen",
            "",
        ))
        .await
        .unwrap();

    assert_eq!(response.smart_tags.sentiment, SentimentLevel::Urgent);
    assert!(response
        .smart_tags
        .urgent_reason
        .as_deref()
        .unwrap()
        .contains("epi-pen"));
    assert_eq!(response.smart_tags.summary, "Guest with an allergy");
    assert!(response.notification_triggered);
}

#[tokio::test]
async fn test_provider_outage_falls_back_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(2)
        .mount(&server)
        .await;

    let state = in_memory_state(provider_config(&server));
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "Birthday dinner", ""))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::Birthday));
    assert_eq!(response.smart_tags.confidence, RULE_BASED_CONFIDENCE);
    assert!(response.smart_tags.summary.starts_with("Rule-based analysis"));
}

#[tokio::test]
async fn test_auth_failure_falls_back_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let state = in_memory_state(provider_config(&server));
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "Gluten-free please", ""))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::DietaryRestriction));
    assert_eq!(response.smart_tags.confidence, RULE_BASED_CONFIDENCE);
}

#[tokio::test]
async fn test_malformed_output_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion(serde_json::json!("I'm not sure what to say")))
        .expect(1)
        .mount(&server)
        .await;

    let state = in_memory_state(provider_config(&server));
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "Kosher meal", ""))
        .await
        .unwrap();

    assert!(response.smart_tags.has_tag(SmartTag::DietaryRestriction));
    assert_eq!(response.smart_tags.confidence, RULE_BASED_CONFIDENCE);
}

#[tokio::test]
async fn test_disabled_provider_is_never_called() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = provider_config(&server);
    config.provider.enabled = false;
    let state = in_memory_state(config);

    assert!(!state.provider_configured());
    let response = state
        .analyze(&reservation(Uuid::new_v4(), None, "VIP", ""))
        .await
        .unwrap();
    assert_eq!(response.smart_tags.confidence, RULE_BASED_CONFIDENCE);
}

#[tokio::test]
async fn test_health_reports_provider_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openai/v1/models"))
        .and(header("Authorization", "Bearer gsk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let health = in_memory_state(provider_config(&server)).health().await;
    assert!(health.provider_configured);
    assert_eq!(health.provider_reachable, Some(true));
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_rejected_key_degrades_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/openai/v1/models"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;

    let health = in_memory_state(provider_config(&server)).health().await;
    assert!(health.database);
    assert_eq!(health.provider_reachable, Some(false));
    assert_eq!(health.status, "degraded");
}
