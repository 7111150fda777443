//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2 connection pooling.
//! Every query is scoped by `tenant_id`.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, ErrorCode, OptionalExtension};
use smart_tagging_core::AnalysisResult;
use uuid::Uuid;

use crate::models::reservation::{
    AnalysisHistoryEntry, CustomerProfile, NewCustomer, TenantContacts,
};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::database_path;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Pragmas applied to every pooled connection
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA busy_timeout = 5000;
     PRAGMA foreign_keys = ON;";

/// Outcome of a single compare-and-swap attempt
enum CommitAttempt {
    Committed(AnalysisResult),
    Conflict,
}

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Create a database from an existing connection pool.
    pub fn from_pool(pool: DbPool) -> AppResult<Self> {
        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database for testing.
    ///
    /// A single pooled connection keeps the schema alive for the pool's lifetime.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        Self::from_pool(pool)
    }

    /// Open the database at the default location (~/.smart-tagging/data.db)
    pub fn new() -> AppResult<Self> {
        let db_path = database_path()?;
        Self::open(&db_path)
    }

    /// Open (or create) a database file with connection pooling
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path)
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        Self::from_pool(pool)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS customer_profiles (
                tenant_id TEXT NOT NULL,
                id TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                phone TEXT,
                email TEXT,
                dietary_preferences TEXT,
                special_request_text TEXT,
                smart_tags TEXT,
                version INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (tenant_id, id),
                UNIQUE (tenant_id, phone)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS analysis_history (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                reservation_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                smart_tags TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_history_tenant_created
             ON analysis_history(tenant_id, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_analysis_history_reservation
             ON analysis_history(tenant_id, reservation_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tenant_settings (
                tenant_id TEXT PRIMARY KEY,
                staff_phone TEXT,
                staff_email TEXT,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Get the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }

    // ========================================================================
    // Customer profiles
    // ========================================================================

    /// Create a customer profile. Fails with `Conflict` when the phone is taken.
    pub fn create_customer(
        &self,
        tenant_id: Uuid,
        customer: &NewCustomer,
    ) -> AppResult<CustomerProfile> {
        let conn = self.get_connection()?;
        let id = Uuid::new_v4();
        let now = now_timestamp();
        let phone = customer
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let inserted = conn.execute(
            "INSERT INTO customer_profiles (tenant_id, id, first_name, last_name, phone, email,
                dietary_preferences, special_request_text, smart_tags, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, 0, ?9, ?9)",
            params![
                tenant_id.to_string(),
                id.to_string(),
                customer.first_name,
                customer.last_name,
                phone,
                customer.email,
                customer.dietary_preferences,
                customer.special_request_text,
                now,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(AppError::conflict(format!(
                    "Customer with phone {} already exists",
                    phone.unwrap_or_default()
                )));
            }
            Err(e) => return Err(e.into()),
        }

        Self::find_customer(&conn, tenant_id, id)?
            .ok_or_else(|| AppError::internal("Customer vanished after insert"))
    }

    /// Get a customer profile by ID.
    pub fn get_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<CustomerProfile>> {
        let conn = self.get_connection()?;
        Self::find_customer(&conn, tenant_id, customer_id)
    }

    /// Customer lookup on a connection the caller already holds.
    fn find_customer(
        conn: &rusqlite::Connection,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<CustomerProfile>> {
        let profile = conn
            .query_row(
                "SELECT tenant_id, id, first_name, last_name, phone, email, dietary_preferences,
                        special_request_text, smart_tags, version, created_at, updated_at
                 FROM customer_profiles WHERE tenant_id = ?1 AND id = ?2",
                params![tenant_id.to_string(), customer_id.to_string()],
                |row| Self::row_to_customer(row),
            )
            .optional()?;

        Ok(profile)
    }

    /// Get a customer profile by phone number.
    pub fn get_customer_by_phone(
        &self,
        tenant_id: Uuid,
        phone: &str,
    ) -> AppResult<Option<CustomerProfile>> {
        let conn = self.get_connection()?;

        let profile = conn
            .query_row(
                "SELECT tenant_id, id, first_name, last_name, phone, email, dietary_preferences,
                        special_request_text, smart_tags, version, created_at, updated_at
                 FROM customer_profiles WHERE tenant_id = ?1 AND phone = ?2",
                params![tenant_id.to_string(), phone.trim()],
                |row| Self::row_to_customer(row),
            )
            .optional()?;

        Ok(profile)
    }

    /// Stored tags for a customer.
    ///
    /// `NotFound` when the customer does not exist in this tenant; `None`
    /// when it exists but has never been analyzed.
    pub fn get_customer_tags(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> AppResult<Option<AnalysisResult>> {
        match self.get_customer(tenant_id, customer_id)? {
            Some(profile) => Ok(profile.smart_tags),
            None => Err(AppError::not_found(format!(
                "Customer {} not found",
                customer_id
            ))),
        }
    }

    // ========================================================================
    // Analysis commit (optimistic concurrency)
    // ========================================================================

    /// Merge `result` into the customer's stored tags and append a history row,
    /// atomically.
    ///
    /// The profile is created on first analysis. A version mismatch or a busy
    /// database rolls back and retries up to `max_attempts` times.
    pub fn commit_analysis(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        reservation_id: Uuid,
        result: &AnalysisResult,
        max_attempts: u32,
    ) -> AppResult<AnalysisResult> {
        let max_attempts = max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let outcome = self
                .get_connection()
                .and_then(|conn| {
                    Self::try_commit(&conn, tenant_id, customer_id, reservation_id, result)
                });

            match outcome {
                Ok(CommitAttempt::Committed(stored)) => return Ok(stored),
                Ok(CommitAttempt::Conflict) => {
                    tracing::debug!(
                        tenant_id = %tenant_id,
                        customer_id = %customer_id,
                        attempt,
                        "Profile version conflict, retrying"
                    );
                }
                Err(e) if e.is_busy() => {
                    tracing::debug!(
                        tenant_id = %tenant_id,
                        customer_id = %customer_id,
                        attempt,
                        "Database busy, retrying"
                    );
                }
                Err(e) => return Err(e),
            }

            if attempt < max_attempts {
                std::thread::sleep(Duration::from_millis(10 * u64::from(attempt)));
            }
        }

        Err(AppError::conflict(format!(
            "Could not commit analysis for customer {} after {} attempts",
            customer_id, max_attempts
        )))
    }

    fn try_commit(
        conn: &rusqlite::Connection,
        tenant_id: Uuid,
        customer_id: Uuid,
        reservation_id: Uuid,
        result: &AnalysisResult,
    ) -> AppResult<CommitAttempt> {
        let tenant = tenant_id.to_string();
        let customer = customer_id.to_string();
        let now = now_timestamp();

        // Dropped without commit on every early return, which rolls back.
        let tx = conn.unchecked_transaction()?;

        let current: Option<(Option<String>, i64)> = tx
            .query_row(
                "SELECT smart_tags, version FROM customer_profiles
                 WHERE tenant_id = ?1 AND id = ?2",
                params![tenant, customer],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let stored = match current {
            None => {
                let json = serde_json::to_string(result)?;
                let inserted = tx.execute(
                    "INSERT INTO customer_profiles (tenant_id, id, smart_tags, version, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 1, ?4, ?4)
                     ON CONFLICT(tenant_id, id) DO NOTHING",
                    params![tenant, customer, json, now],
                )?;
                if inserted == 0 {
                    return Ok(CommitAttempt::Conflict);
                }
                result.clone()
            }
            Some((existing, version)) => {
                let previous = existing
                    .as_deref()
                    .map(|json| serde_json::from_str::<AnalysisResult>(json));
                let merged = match previous {
                    Some(Ok(previous)) => previous.merged_with(result),
                    Some(Err(e)) => {
                        tracing::warn!(
                            tenant_id = %tenant_id,
                            customer_id = %customer_id,
                            error = %e,
                            "Stored smart tags unreadable, replacing"
                        );
                        result.clone()
                    }
                    None => result.clone(),
                };
                let json = serde_json::to_string(&merged)?;
                let updated = tx.execute(
                    "UPDATE customer_profiles SET smart_tags = ?1, version = version + 1, updated_at = ?2
                     WHERE tenant_id = ?3 AND id = ?4 AND version = ?5",
                    params![json, now, tenant, customer, version],
                )?;
                if updated == 0 {
                    return Ok(CommitAttempt::Conflict);
                }
                merged
            }
        };

        tx.execute(
            "INSERT INTO analysis_history (id, tenant_id, reservation_id, customer_id, smart_tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                tenant,
                reservation_id.to_string(),
                customer,
                serde_json::to_string(result)?,
                now,
            ],
        )?;

        tx.commit()?;
        Ok(CommitAttempt::Committed(stored))
    }

    // ========================================================================
    // Analysis history
    // ========================================================================

    /// List a tenant's analysis history, newest first.
    pub fn list_history(&self, tenant_id: Uuid, limit: u32) -> AppResult<Vec<AnalysisHistoryEntry>> {
        let conn = self.get_connection()?;

        let mut stmt = conn.prepare(
            "SELECT id, tenant_id, reservation_id, customer_id, smart_tags, created_at
             FROM analysis_history WHERE tenant_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;

        let entries = stmt
            .query_map(params![tenant_id.to_string(), limit], |row| {
                Self::row_to_history(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    // ========================================================================
    // Tenant settings
    // ========================================================================

    /// Store the tenant's alert recipients.
    pub fn set_tenant_contacts(&self, tenant_id: Uuid, contacts: &TenantContacts) -> AppResult<()> {
        let conn = self.get_connection()?;

        conn.execute(
            "INSERT INTO tenant_settings (tenant_id, staff_phone, staff_email, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(tenant_id) DO UPDATE SET
                staff_phone = excluded.staff_phone,
                staff_email = excluded.staff_email,
                updated_at = excluded.updated_at",
            params![
                tenant_id.to_string(),
                contacts.staff_phone,
                contacts.staff_email,
                now_timestamp(),
            ],
        )?;

        Ok(())
    }

    /// Get the tenant's alert recipients (empty when never set).
    pub fn get_tenant_contacts(&self, tenant_id: Uuid) -> AppResult<TenantContacts> {
        let conn = self.get_connection()?;

        let contacts = conn
            .query_row(
                "SELECT staff_phone, staff_email FROM tenant_settings WHERE tenant_id = ?1",
                params![tenant_id.to_string()],
                |row| {
                    Ok(TenantContacts {
                        staff_phone: row.get(0)?,
                        staff_email: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(contacts.unwrap_or_default())
    }

    // ========================================================================
    // Row mapping
    // ========================================================================

    fn row_to_customer(row: &rusqlite::Row) -> rusqlite::Result<CustomerProfile> {
        let tenant_id: String = row.get(0)?;
        let id: String = row.get(1)?;
        let smart_tags: Option<String> = row.get(8)?;
        let created_at: String = row.get(10)?;
        let updated_at: String = row.get(11)?;

        Ok(CustomerProfile {
            tenant_id: parse_uuid(0, &tenant_id)?,
            id: parse_uuid(1, &id)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            phone: row.get(4)?,
            email: row.get(5)?,
            dietary_preferences: row.get(6)?,
            special_request_text: row.get(7)?,
            smart_tags: smart_tags.and_then(|json| match serde_json::from_str(&json) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        customer_id = %id,
                        error = %e,
                        "Stored smart tags unreadable, ignoring"
                    );
                    None
                }
            }),
            version: row.get(9)?,
            created_at: parse_timestamp(10, &created_at)?,
            updated_at: parse_timestamp(11, &updated_at)?,
        })
    }

    fn row_to_history(row: &rusqlite::Row) -> rusqlite::Result<AnalysisHistoryEntry> {
        let id: String = row.get(0)?;
        let tenant_id: String = row.get(1)?;
        let reservation_id: String = row.get(2)?;
        let customer_id: String = row.get(3)?;
        let smart_tags: String = row.get(4)?;
        let created_at: String = row.get(5)?;

        let result = serde_json::from_str(&smart_tags).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(AnalysisHistoryEntry {
            id: parse_uuid(0, &id)?,
            tenant_id: parse_uuid(1, &tenant_id)?,
            reservation_id: parse_uuid(2, &reservation_id)?,
            customer_id: parse_uuid(3, &customer_id)?,
            result,
            created_at: parse_timestamp(5, &created_at)?,
        })
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_uuid(column: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("pool_size", &self.pool.state().connections)
            .finish()
    }
}
