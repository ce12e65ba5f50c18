use async_trait::async_trait;
use serde_json::Value;

use crate::error::CoreError;

/// `verify_token(token) -> {uid, email} | nil` (§6 Authentication interface). Must be callable
/// off the main event path; a timeout or verification failure closes the session with
/// `auth_error`, which this crate models as `CoreError::Transient`/`CoreError::Rejected`
/// depending on whether the cause was transport-side or credential-side.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, CoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: String,
}

/// The document-oriented key-value store named in §6: per-record get/set/delete on named
/// collections, a bounded batch write, and a transaction primitive the store re-runs on write
/// conflicts. `try_consume_spawn_eligibility` (component D) is the one caller in this crate
/// that needs the transaction primitive's re-run guarantee; everything else here is read/write
/// plumbing the runtime state store would delegate to if it were backed by a real database
/// instead of the in-process maps `RuntimeStateStore` uses today.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, CoreError>;
    async fn set(&self, collection: &str, key: &str, value: Value) -> Result<(), CoreError>;
    async fn delete(&self, collection: &str, key: &str) -> Result<(), CoreError>;

    /// At most 500 operations per call (§6 Storage interface).
    async fn batch_write(&self, ops: Vec<StorageOp>) -> Result<(), CoreError>;

    /// Re-runs `apply` on write conflicts; `apply` receives the current document (or `None` if
    /// absent) and returns the new value to commit.
    async fn transaction(
        &self,
        collection: &str,
        key: &str,
        apply: Box<dyn Fn(Option<Value>) -> Value + Send + Sync>,
    ) -> Result<Value, CoreError>;
}

#[derive(Clone, Debug)]
pub enum StorageOp {
    Set {
        collection: String,
        key: String,
        value: Value,
    },
    Delete {
        collection: String,
        key: String,
    },
}

pub const MAX_BATCH_WRITE_OPS: usize = 500;
