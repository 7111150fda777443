//! Persistence Integration Tests
//!
//! Concurrent profile updates on a file-backed database and tenant isolation.

use smart_tagging::models::reservation::NewCustomer;
use smart_tagging::storage::Database;
use smart_tagging::{AppError, AppState, SmartTag};
use tempfile::TempDir;
use uuid::Uuid;

use crate::common::{in_memory_state, offline_config, reservation};

const DISJOINT_NOTES: &[(&str, SmartTag)] = &[
    ("VIP table", SmartTag::Vip),
    ("Famous actor", SmartTag::Celeb),
    ("Frequent guest", SmartTag::FrequentVisitor),
    ("Birthday dinner", SmartTag::Birthday),
    ("Anniversary dinner", SmartTag::Anniversary),
    ("Was a no-show last month", SmartTag::NoShow),
    ("Vegan menu", SmartTag::DietaryRestriction),
    ("Lactose intolerant", SmartTag::Allergy),
];

fn file_backed_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(&dir.path().join("smart_tagging.db")).unwrap();
    let state = AppState::with_database(offline_config(), db).unwrap();
    (dir, state)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_keep_every_tag() {
    let (_dir, state) = file_backed_state();
    let tenant = Uuid::new_v4();
    let customer = Uuid::new_v4();

    let handles: Vec<_> = DISJOINT_NOTES
        .iter()
        .map(|(note, _)| {
            let state = state.clone();
            let input = reservation(tenant, Some(customer), note, "");
            tokio::spawn(async move { state.analyze(&input).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = state
        .get_customer_tags(tenant, customer)
        .await
        .unwrap()
        .unwrap();
    for (_, tag) in DISJOINT_NOTES {
        assert!(stored.has_tag(*tag), "missing {}", tag);
    }
    assert_eq!(stored.tags.len(), DISJOINT_NOTES.len());

    let history = state.list_history(tenant, 100).await.unwrap();
    assert_eq!(history.len(), DISJOINT_NOTES.len());
    assert_eq!(state.orchestrator().persistence().active_locks(), 0);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let (_dir, state) = file_backed_state();
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let customer = Uuid::new_v4();

    state
        .analyze(&reservation(tenant_a, Some(customer), "VIP guest", ""))
        .await
        .unwrap();
    state
        .analyze(&reservation(tenant_b, Some(customer), "Birthday dinner", ""))
        .await
        .unwrap();

    let a = state
        .get_customer_tags(tenant_a, customer)
        .await
        .unwrap()
        .unwrap();
    let b = state
        .get_customer_tags(tenant_b, customer)
        .await
        .unwrap()
        .unwrap();

    assert!(a.has_tag(SmartTag::Vip) && !a.has_tag(SmartTag::Birthday));
    assert!(b.has_tag(SmartTag::Birthday) && !b.has_tag(SmartTag::Vip));
    assert_eq!(state.list_history(tenant_a, 10).await.unwrap().len(), 1);
    assert_eq!(state.list_history(tenant_b, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_customer_phone_unique_per_tenant() {
    let (_dir, state) = file_backed_state();
    let tenant = Uuid::new_v4();
    let other_tenant = Uuid::new_v4();
    let customer = NewCustomer::with_phone("+15550001111");

    let created = state.create_customer(tenant, customer.clone()).await.unwrap();
    let err = state
        .create_customer(tenant, customer.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Same phone is fine under another tenant
    state.create_customer(other_tenant, customer).await.unwrap();

    let found = state
        .get_customer_by_phone(tenant, "+15550001111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
    assert!(found.smart_tags.is_none());
}

#[tokio::test]
async fn test_analysis_updates_existing_customer() {
    let (_dir, state) = file_backed_state();
    let tenant = Uuid::new_v4();
    let created = state
        .create_customer(tenant, NewCustomer::with_phone("+15550002222"))
        .await
        .unwrap();

    state
        .analyze(&reservation(tenant, Some(created.id), "Celebrity guest", ""))
        .await
        .unwrap();

    let profile = state
        .get_customer_by_phone(tenant, "+15550002222")
        .await
        .unwrap()
        .unwrap();
    assert!(profile.smart_tags.unwrap().has_tag(SmartTag::Celeb));
    assert_eq!(profile.version, created.version + 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_customer_creation_in_memory() {
    let state = in_memory_state(offline_config());
    let tenant = Uuid::new_v4();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .create_customer(tenant, NewCustomer::with_phone(format!("+1555000{:04}", i)))
                    .await
            })
        })
        .collect();

    let started = std::time::Instant::now();
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    assert!(started.elapsed() < std::time::Duration::from_secs(5));

    for (i, id) in ids.iter().enumerate() {
        let found = state
            .get_customer_by_phone(tenant, format!("+1555000{:04}", i))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, *id);
    }
}
