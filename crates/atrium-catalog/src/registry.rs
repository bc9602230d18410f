//! # Tenant-Scoped Registries
//!
//! In-memory registries for services and requests. Every operation takes
//! a `TenantId` first; a tenant can only ever observe its own rows.
//!
//! The registries are plain data structures — locking and sharing is the
//! caller's concern (the API layer wraps them in `std::sync::RwLock` and
//! never holds the guard across an await point).

use std::collections::HashMap;

use atrium_core::{RequestId, ServiceId, TenantId, Timestamp};

use crate::request::{RequestError, ServiceRequest};
use crate::service::{CatalogError, Service};

// ─── Catalog Registry ────────────────────────────────────────────────

/// Tenant-scoped registry of catalog services.
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    services: HashMap<TenantId, HashMap<ServiceId, Service>>,
}

impl CatalogRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a validated service into its tenant's catalog.
    pub fn insert(&mut self, service: Service) -> Result<ServiceId, CatalogError> {
        service.validate()?;
        let id = service.id;
        self.services
            .entry(service.tenant_id)
            .or_default()
            .insert(id, service);
        Ok(id)
    }

    /// Fetch a service from the tenant's catalog.
    pub fn get(&self, tenant_id: TenantId, id: ServiceId) -> Result<&Service, CatalogError> {
        self.services
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(CatalogError::NotFound(id))
    }

    /// List the tenant's services, sorted by name for stable output.
    pub fn list(&self, tenant_id: TenantId) -> Vec<&Service> {
        let mut services: Vec<&Service> = self
            .services
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        services.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        services
    }

    /// Replace a service after an edit, re-validating it.
    pub fn update(&mut self, mut service: Service) -> Result<(), CatalogError> {
        service.validate()?;
        let slot = self
            .services
            .get_mut(&service.tenant_id)
            .and_then(|m| m.get_mut(&service.id))
            .ok_or(CatalogError::NotFound(service.id))?;
        service.created_at = slot.created_at;
        service.updated_at = Timestamp::now();
        *slot = service;
        Ok(())
    }

    /// Soft-delete: mark a service inactive. The row stays for reporting.
    pub fn deactivate(&mut self, tenant_id: TenantId, id: ServiceId) -> Result<(), CatalogError> {
        let service = self
            .services
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(CatalogError::NotFound(id))?;
        service.active = false;
        service.updated_at = Timestamp::now();
        Ok(())
    }
}

// ─── Request Registry ────────────────────────────────────────────────

/// Tenant-scoped registry of service requests.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    requests: HashMap<TenantId, HashMap<RequestId, ServiceRequest>>,
}

impl RequestRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a request into its tenant's registry.
    pub fn insert(&mut self, request: ServiceRequest) -> RequestId {
        let id = request.id;
        self.requests
            .entry(request.tenant_id)
            .or_default()
            .insert(id, request);
        id
    }

    /// Fetch a request.
    pub fn get(&self, tenant_id: TenantId, id: RequestId) -> Result<&ServiceRequest, RequestError> {
        self.requests
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(RequestError::NotFound(id))
    }

    /// Fetch a request mutably (for workflow transitions).
    pub fn get_mut(
        &mut self,
        tenant_id: TenantId,
        id: RequestId,
    ) -> Result<&mut ServiceRequest, RequestError> {
        self.requests
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(RequestError::NotFound(id))
    }

    /// List the tenant's requests, newest first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<&ServiceRequest> {
        let mut requests: Vec<&ServiceRequest> = self
            .requests
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        requests
    }

    /// Count requests for a service created at or after `since`.
    ///
    /// This is the demand signal the pricing chain's demand multiplier
    /// feeds on. Cancelled requests still count — they were demand.
    pub fn count_recent(&self, tenant_id: TenantId, service_id: ServiceId, since: Timestamp) -> u32 {
        self.requests
            .get(&tenant_id)
            .map(|m| {
                m.values()
                    .filter(|r| r.service_id == service_id && r.created_at >= since)
                    .count() as u32
            })
            .unwrap_or(0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
