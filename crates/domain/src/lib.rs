//! # homehub-domain
//!
//! Pure domain model for the homehub component bootstrap.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **setup failure taxonomy** and its retry policy
//! - Define **configuration keys** (`light`, `light 2`, …) and how they map
//!   to component domains
//! - Define the **stage-1 allowlist** and the **dependency blacklist**
//! - Define **Events** published while components come online
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod config;
pub mod dependency;
pub mod event;
pub mod stage;
