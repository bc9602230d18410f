//! # Application State
//!
//! Shared state for the Axum application: the domain registries behind
//! one lock, plus the resolved API credentials.
//!
//! Handlers take the lock for the duration of one request and never
//! hold it across an await point.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use atrium_booking::{ScheduleBoard, SpaceRegistry};
use atrium_catalog::{CatalogRegistry, RequestRegistry};
use atrium_compliance::{AuditTrail, ConsentLedger, RetentionPolicySet};
use atrium_contracts::ContractRegistry;
use atrium_core::RequestId;
use atrium_pricing::PriceQuote;

use crate::auth::ApiKeys;
use crate::error::AppError;

/// All domain stores, owned together so one request sees one
/// consistent view.
#[derive(Debug, Default)]
pub struct Store {
    /// Service catalog.
    pub catalog: CatalogRegistry,
    /// Service requests.
    pub requests: RequestRegistry,
    /// Quote computed when each request was priced, by request id.
    pub quotes: HashMap<RequestId, PriceQuote>,
    /// Contracts, renewal rules, and proposals.
    pub contracts: ContractRegistry,
    /// GDPR consent ledger.
    pub consents: ConsentLedger,
    /// Data-retention policies.
    pub retention: RetentionPolicySet,
    /// Hash-chained audit trail.
    pub audit: AuditTrail,
    /// Workspace inventory.
    pub spaces: SpaceRegistry,
    /// Bookings and conflict detection.
    pub schedule: ScheduleBoard,
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    keys: Arc<ApiKeys>,
}

impl AppState {
    /// Create application state with the given credentials.
    pub fn new(keys: ApiKeys) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            keys: Arc::new(keys),
        }
    }

    /// The configured API credentials.
    pub fn keys(&self) -> &ApiKeys {
        &self.keys
    }

    /// Take the store for reading.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, Store>, AppError> {
        self.store
            .read()
            .map_err(|_| AppError::Internal("state lock poisoned".to_string()))
    }

    /// Take the store for writing.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, AppError> {
        self.store
            .write()
            .map_err(|_| AppError::Internal("state lock poisoned".to_string()))
    }
}
