//! Tenant-Scoped Persistence Coordinator
//!
//! Sole writer of customer tag state and analysis history. Writers to the same
//! `(tenant_id, customer_id)` are serialized in-process by a per-profile async
//! mutex; the database's version check covers writers in other processes.
//! Different customers and tenants never contend.

use std::sync::Arc;

use dashmap::DashMap;
use smart_tagging_core::AnalysisResult;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::reservation::{
    AnalysisHistoryEntry, CustomerProfile, NewCustomer, TenantContacts,
};
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};

type ProfileKey = (Uuid, Uuid);

pub struct PersistenceCoordinator {
    db: Database,
    locks: DashMap<ProfileKey, Arc<Mutex<()>>>,
    max_commit_attempts: u32,
}

impl PersistenceCoordinator {
    pub fn new(db: Database, max_commit_attempts: u32) -> Self {
        Self {
            db,
            locks: DashMap::new(),
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Merge `result` into the stored profile and append history, atomically.
    ///
    /// Returns the result as stored. Once started, the database work runs to
    /// completion even if the caller goes away, so a profile is never left
    /// half-merged.
    pub async fn commit(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        reservation_id: Uuid,
        result: &AnalysisResult,
    ) -> AppResult<AnalysisResult> {
        let entry = ProfileLock::acquire(&self.locks, (tenant_id, customer_id));
        let _guard = entry.mutex().lock().await;

        let result = result.clone();
        let max_attempts = self.max_commit_attempts;
        self.run_blocking(move |db| {
            db.commit_analysis(tenant_id, customer_id, reservation_id, &result, max_attempts)
        })
        .await
    }

    /// Stored tags; `NotFound` for an unknown customer.
    pub async fn customer_tags(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<AnalysisResult>> {
        self.run_blocking(move |db| db.get_customer_tags(tenant_id, customer_id))
            .await
    }

    pub async fn create_customer(
        &self,
        tenant_id: Uuid,
        customer: NewCustomer,
    ) -> AppResult<CustomerProfile> {
        self.run_blocking(move |db| db.create_customer(tenant_id, &customer))
            .await
    }

    pub async fn get_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<CustomerProfile>> {
        self.run_blocking(move |db| db.get_customer(tenant_id, customer_id))
            .await
    }

    pub async fn get_customer_by_phone(
        &self,
        tenant_id: Uuid,
        phone: String,
    ) -> AppResult<Option<CustomerProfile>> {
        self.run_blocking(move |db| db.get_customer_by_phone(tenant_id, &phone))
            .await
    }

    pub async fn tenant_contacts(&self, tenant_id: Uuid) -> AppResult<TenantContacts> {
        self.run_blocking(move |db| db.get_tenant_contacts(tenant_id))
            .await
    }

    pub async fn set_tenant_contacts(
        &self,
        tenant_id: Uuid,
        contacts: TenantContacts,
    ) -> AppResult<()> {
        self.run_blocking(move |db| db.set_tenant_contacts(tenant_id, &contacts))
            .await
    }

    pub async fn list_history(
        &self,
        tenant_id: Uuid,
        limit: u32,
    ) -> AppResult<Vec<AnalysisHistoryEntry>> {
        self.run_blocking(move |db| db.list_history(tenant_id, limit))
            .await
    }

    /// Number of profiles with a writer in flight.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    async fn run_blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| AppError::internal(format!("Storage task failed: {}", e)))?
    }
}

/// Registry handle for one profile's mutex.
///
/// Dropping it removes the registry entry once no other writer holds it,
/// including when the owning future is cancelled.
struct ProfileLock<'a> {
    locks: &'a DashMap<ProfileKey, Arc<Mutex<()>>>,
    key: ProfileKey,
    mutex: Arc<Mutex<()>>,
}

impl<'a> ProfileLock<'a> {
    fn acquire(locks: &'a DashMap<ProfileKey, Arc<Mutex<()>>>, key: ProfileKey) -> Self {
        let mutex = locks.entry(key).or_default().clone();
        Self { locks, key, mutex }
    }

    fn mutex(&self) -> &Mutex<()> {
        &self.mutex
    }
}

impl Drop for ProfileLock<'_> {
    fn drop(&mut self) {
        // The map and this handle are the only owners left
        self.locks
            .remove_if(&self.key, |_, l| Arc::strong_count(l) == 2);
    }
}
