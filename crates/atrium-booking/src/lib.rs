//! # atrium-booking — Spaces and Bookings
//!
//! Workspace inventory and the booking lifecycle.
//!
//! ## Contents
//!
//! - [`space`] — bookable spaces (desks, rooms, offices) and their
//!   tenant-scoped registry.
//! - [`booking`] — the booking state machine
//!   (Pending → Confirmed → CheckedIn → Completed, with Cancelled and
//!   NoShow exits).
//! - [`schedule`] — the schedule board: conflict-checked placement of
//!   bookings over half-open `[start, end)` windows.

pub mod booking;
pub mod schedule;
pub mod space;

pub use booking::{Booking, BookingError, BookingState, BookingTransitionRecord};
pub use schedule::ScheduleBoard;
pub use space::{Space, SpaceError, SpaceKind, SpaceRegistry};
