//! # zonehub-domain
//!
//! Pure domain model for the zonehub home automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (capability-tagged wrappers around one or more items)
//! - Define **Zones** (rooms/areas holding devices, with level and neighbors)
//! - Define **Zone events** (motion, door open, alarm change, timer, …)
//! - Define **Action descriptors** (which events/zones/devices an action reacts to)
//! - Define **Alerts** and the range-violation threshold tracker
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod activity;
pub mod alert;
pub mod device;
pub mod event;
pub mod level;
pub mod neighbor;
pub mod range_alert;
pub mod zone;
