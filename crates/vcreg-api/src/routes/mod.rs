//! # API Route Modules
//!
//! - `identity`: identity registration, metadata updates, lookups.
//! - `credentials`: issuance, verification, revocation.
//! - `admin`: pause toggle, status, and the height clock.

pub mod admin;
pub mod credentials;
pub mod identity;
