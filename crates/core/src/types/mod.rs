//! Core types for the Sareine admin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod email;
pub mod id;
pub mod status;
pub mod timestamp;

pub use amount::Amount;
pub use email::{EmailAddress, EmailAddressError};
pub use id::*;
pub use status::*;
