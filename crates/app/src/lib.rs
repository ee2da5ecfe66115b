//! # fieldgate-app
//!
//! Application layer: the irrigation control loop and its **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `CommandPublisher`: hand a gate command to the transport
//!   - `EventPublisher`: announce readings and gate transitions
//!   - `Clock`: the time source used for cooldowns
//! - Own the **zone state store** (one mutex-guarded record per zone)
//! - Run the **decision engine** (routing → cooldown → hysteresis → command)
//! - Provide the **reading dispatcher**, the single entry point for decoded
//!   telemetry
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `fieldgate-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod decision_engine;
pub mod dispatcher;
pub mod event_bus;
pub mod ports;
pub mod zone_store;
