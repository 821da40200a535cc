//! Core types shared across Hotdeck facilities
//!
//! This crate provides the canonical field keys and event names used by
//! the logging facility and by every component that emits structured events.

pub mod schema;
