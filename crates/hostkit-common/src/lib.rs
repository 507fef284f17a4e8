//! HostKit Common - Shared types for game-server provisioning
//!
//! This crate provides the value types shared across the HostKit workspace:
//! - Deterministic resource naming
//! - Protocol-level constants that must not drift between releases
//! - Shared error kinds

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod name;

pub use error::*;
pub use name::*;
