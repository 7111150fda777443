//! Integration Tests Module
//!
//! End-to-end coverage of the analyze pipeline: classification with and
//! without a provider, urgency override, profile merging under concurrency,
//! tenant isolation, notification fan-out and configuration loading.

// Shared fixtures
mod common;

// Analyze pipeline with the rule-based classifier
mod pipeline_test;

// AI provider over a mock chat-completions endpoint
mod provider_test;

// Concurrent profile updates and tenant isolation
mod persistence_test;

// Notification channels over mock HTTP endpoints
mod notification_test;

// Config file and environment overrides
mod config_test;
