//! # Authentication Middleware
//!
//! Bearer-token authentication for API endpoints. Every `/v1` route
//! requires a credential; health probes are unauthenticated.
//!
//! Credentials are static API keys, each bound to one tenant and an
//! actor name for the audit trail. The configured format is
//! `actor:token:tenant-uuid`, comma-separated
//! (e.g., `ops:s3cret:0b5e...,ci:t0ken:77aa...`).

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use atrium_core::TenantId;

use crate::error::AppError;
use crate::state::AppState;

/// The resolved caller identity, injected into request extensions.
#[derive(Debug, Clone)]
pub struct TenantContext {
    /// The tenant every store access is scoped to.
    pub tenant_id: TenantId,
    /// Actor name recorded in the audit trail.
    pub actor: String,
}

/// Static API-key table: token → tenant context.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<String, TenantContext>,
}

impl ApiKeys {
    /// Create an empty key table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one credential.
    pub fn register(
        &mut self,
        token: impl Into<String>,
        actor: impl Into<String>,
        tenant_id: TenantId,
    ) {
        self.keys.insert(
            token.into(),
            TenantContext {
                tenant_id,
                actor: actor.into(),
            },
        );
    }

    /// Resolve a bearer token.
    pub fn lookup(&self, token: &str) -> Option<&TenantContext> {
        self.keys.get(token)
    }

    /// Number of configured credentials.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no credentials are configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromStr for ApiKeys {
    type Err = AppError;

    /// Parse `actor:token:tenant-uuid` entries, comma-separated.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut keys = ApiKeys::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(3, ':');
            let (actor, token, tenant) = match (parts.next(), parts.next(), parts.next()) {
                (Some(a), Some(t), Some(id)) if !a.is_empty() && !t.is_empty() => (a, t, id),
                _ => {
                    return Err(AppError::Validation(format!(
                        "malformed API key entry (want actor:token:tenant-uuid): {entry}"
                    )))
                }
            };
            let tenant_id = Uuid::parse_str(tenant)
                .map(TenantId::from)
                .map_err(|e| AppError::Validation(format!("bad tenant uuid in API key: {e}")))?;
            keys.register(token, actor, tenant_id);
        }
        Ok(keys)
    }
}

/// Middleware: require a configured bearer token and inject the
/// resolved [`TenantContext`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected a Bearer credential".to_string()))?;

    let ctx = state
        .keys()
        .lookup(token)
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("unknown API key".to_string()))?;

    tracing::debug!(tenant = %ctx.tenant_id, actor = %ctx.actor, "authenticated request");
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_entries() {
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let spec = format!("ops:alpha:{tenant_a}, ci:beta:{tenant_b}");
        let keys: ApiKeys = spec.parse().unwrap();
        assert_eq!(keys.len(), 2);
        let ctx = keys.lookup("alpha").unwrap();
        assert_eq!(ctx.actor, "ops");
        assert_eq!(ctx.tenant_id, TenantId::from(tenant_a));
    }

    #[test]
    fn test_parse_rejects_malformed_entry() {
        assert!("just-a-token".parse::<ApiKeys>().is_err());
        assert!(":token:not-a-uuid".parse::<ApiKeys>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_uuid() {
        assert!("ops:token:not-a-uuid".parse::<ApiKeys>().is_err());
    }

    #[test]
    fn test_empty_spec_yields_no_keys() {
        let keys: ApiKeys = "".parse().unwrap();
        assert!(keys.is_empty());
    }
}
