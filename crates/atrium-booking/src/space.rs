//! # Bookable Spaces
//!
//! Physical inventory a tenant rents out by the hour: desks, meeting
//! rooms, offices, event space. Spaces are soft-deactivated, never
//! deleted, so historical bookings keep a valid reference.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atrium_core::{Money, SpaceId, TenantId, Timestamp};

/// The kind of physical space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceKind {
    /// A single hot desk.
    HotDesk,
    /// A reserved desk.
    DedicatedDesk,
    /// A bookable meeting room.
    MeetingRoom,
    /// A lockable private office.
    PrivateOffice,
    /// Open space for events.
    EventSpace,
    /// A phone or focus booth.
    PhoneBooth,
}

impl SpaceKind {
    /// The wire identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotDesk => "hot_desk",
            Self::DedicatedDesk => "dedicated_desk",
            Self::MeetingRoom => "meeting_room",
            Self::PrivateOffice => "private_office",
            Self::EventSpace => "event_space",
            Self::PhoneBooth => "phone_booth",
        }
    }
}

impl std::fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceKind {
    type Err = SpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hot_desk" => Ok(Self::HotDesk),
            "dedicated_desk" => Ok(Self::DedicatedDesk),
            "meeting_room" => Ok(Self::MeetingRoom),
            "private_office" => Ok(Self::PrivateOffice),
            "event_space" => Ok(Self::EventSpace),
            "phone_booth" => Ok(Self::PhoneBooth),
            other => Err(SpaceError::UnknownKind(other.to_string())),
        }
    }
}

/// Errors from space management.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Space name must be non-empty.
    #[error("space name must be non-empty")]
    EmptyName,

    /// Capacity must be at least 1.
    #[error("space capacity must be at least 1")]
    ZeroCapacity,

    /// Unrecognized space kind.
    #[error("unknown space kind: {0}")]
    UnknownKind(String),

    /// No space with the given id in the tenant's registry.
    #[error("space not found: {0}")]
    NotFound(SpaceId),
}

/// One bookable space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    /// Unique space identifier.
    pub id: SpaceId,
    /// The tenant that owns this space.
    pub tenant_id: TenantId,
    /// Display name (e.g., "Meeting Room B, 3rd floor").
    pub name: String,
    /// The kind of space.
    pub kind: SpaceKind,
    /// Maximum occupancy.
    pub capacity: u32,
    /// Rate charged per booked hour.
    pub hourly_rate: Money,
    /// Inactive spaces are kept but cannot take new bookings.
    pub active: bool,
    /// When the space was registered.
    pub created_at: Timestamp,
}

impl Space {
    /// Register a new active space.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        kind: SpaceKind,
        capacity: u32,
        hourly_rate: Money,
    ) -> Result<Self, SpaceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SpaceError::EmptyName);
        }
        if capacity == 0 {
            return Err(SpaceError::ZeroCapacity);
        }
        Ok(Self {
            id: SpaceId::new(),
            tenant_id,
            name,
            kind,
            capacity,
            hourly_rate,
            active: true,
            created_at: Timestamp::now(),
        })
    }
}

/// Tenant-scoped space inventory.
#[derive(Debug, Default)]
pub struct SpaceRegistry {
    spaces: HashMap<TenantId, HashMap<SpaceId, Space>>,
}

impl SpaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a space.
    pub fn insert(&mut self, space: Space) -> SpaceId {
        let id = space.id;
        self.spaces
            .entry(space.tenant_id)
            .or_default()
            .insert(id, space);
        id
    }

    /// Fetch a space.
    pub fn get(&self, tenant_id: TenantId, id: SpaceId) -> Result<&Space, SpaceError> {
        self.spaces
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(SpaceError::NotFound(id))
    }

    /// Fetch a space mutably.
    pub fn get_mut(&mut self, tenant_id: TenantId, id: SpaceId) -> Result<&mut Space, SpaceError> {
        self.spaces
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(SpaceError::NotFound(id))
    }

    /// List the tenant's spaces sorted by name.
    pub fn list(&self, tenant_id: TenantId) -> Vec<&Space> {
        let mut spaces: Vec<&Space> = self
            .spaces
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        spaces.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        spaces
    }

    /// Deactivate a space. Existing bookings are unaffected.
    pub fn deactivate(&mut self, tenant_id: TenantId, id: SpaceId) -> Result<(), SpaceError> {
        self.get_mut(tenant_id, id)?.active = false;
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
