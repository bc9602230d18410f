//! # Schedule Board — Conflict-Checked Placement
//!
//! Tenant-scoped store of bookings with overlap checking at placement
//! time.
//!
//! ## Invariant
//!
//! For one space, no two bookings whose states block the schedule have
//! overlapping `[start, end)` windows. Cancelled and NoShow bookings
//! release their window immediately.

use std::collections::HashMap;

use atrium_core::{BookingId, SpaceId, TenantId, Timestamp};

use crate::booking::{Booking, BookingError};

/// Tenant-scoped booking store with conflict detection.
#[derive(Debug, Default)]
pub struct ScheduleBoard {
    bookings: HashMap<TenantId, HashMap<BookingId, Booking>>,
}

impl ScheduleBoard {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// The first schedule-blocking booking for `space_id` whose window
    /// overlaps `[start, end)`, if any. Deterministic: earliest window
    /// start wins ties.
    pub fn find_conflict(
        &self,
        tenant_id: TenantId,
        space_id: SpaceId,
        start: Timestamp,
        end: Timestamp,
    ) -> Option<&Booking> {
        self.bookings
            .get(&tenant_id)?
            .values()
            .filter(|b| {
                b.space_id == space_id && b.state.blocks_schedule() && b.overlaps(start, end)
            })
            .min_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)))
    }

    /// Place a booking, rejecting it if its window conflicts.
    pub fn place(&mut self, booking: Booking) -> Result<BookingId, BookingError> {
        if let Some(existing) =
            self.find_conflict(booking.tenant_id, booking.space_id, booking.start, booking.end)
        {
            return Err(BookingError::Conflict(existing.id));
        }
        let id = booking.id;
        self.bookings
            .entry(booking.tenant_id)
            .or_default()
            .insert(id, booking);
        Ok(id)
    }

    /// Fetch a booking.
    pub fn get(&self, tenant_id: TenantId, id: BookingId) -> Result<&Booking, BookingError> {
        self.bookings
            .get(&tenant_id)
            .and_then(|m| m.get(&id))
            .ok_or(BookingError::NotFound(id))
    }

    /// Fetch a booking mutably (lifecycle transitions).
    pub fn get_mut(
        &mut self,
        tenant_id: TenantId,
        id: BookingId,
    ) -> Result<&mut Booking, BookingError> {
        self.bookings
            .get_mut(&tenant_id)
            .and_then(|m| m.get_mut(&id))
            .ok_or(BookingError::NotFound(id))
    }

    /// The tenant's bookings, earliest window first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<&Booking> {
        let mut bookings: Vec<&Booking> = self
            .bookings
            .get(&tenant_id)
            .map(|m| m.values().collect())
            .unwrap_or_default();
        bookings.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
        bookings
    }

    /// The tenant's bookings for one space, earliest window first.
    pub fn list_for_space(&self, tenant_id: TenantId, space_id: SpaceId) -> Vec<&Booking> {
        self.list(tenant_id)
            .into_iter()
            .filter(|b| b.space_id == space_id)
            .collect()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
