//! # fieldgate-domain
//!
//! Pure domain model for the fieldgate irrigation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Readings** (sensor telemetry, tagged by sensor kind)
//! - Define the **Routing Table** (which zone each sensor feeds)
//! - Define **Zone State** and the hysteresis/cooldown rule that drives it
//! - Define **Gate Commands** (OPEN / CLOSE actuation requests)
//! - Define **Events** (records handed to telemetry collaborators)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod gate;
pub mod policy;
pub mod reading;
pub mod routing;
pub mod zone;
