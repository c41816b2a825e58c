//! # CliniSlot Engine
//!
//! The slot lifecycle engine: materializes the rolling window of
//! bookable slots, retires stale unbooked ones, reclaims slots from
//! past appointments, and drives the whole thing on a daily civil-time
//! cadence.
//!
//! ## Architecture
//!
//! - **store**: the persistence boundary as async traits, with
//!   Postgres implementations delegating to `clinislot-db`
//! - **materializer**: derives and inserts the missing slots for one
//!   civil day
//! - **maintainer**: the window/retention/reclamation orchestrator
//! - **scheduler**: cron-backed recurring triggers in a fixed zone
//! - **config**: environment-driven engine settings

/// Engine configuration loaded from the environment
pub mod config;
/// Window maintenance orchestration
pub mod maintainer;
/// Per-day slot materialization
pub mod materializer;
/// Recurring trigger registration
pub mod scheduler;
/// Persistence-boundary traits and Postgres implementations
pub mod store;
