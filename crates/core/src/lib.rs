//! Sareine Core - Shared types library.
//!
//! This crate provides common types used across the Sareine admin components:
//! - `admin` - Internal dashboard and REST API
//! - `cli` - Command-line tools for migrations and imports
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document ids, rupee amounts, email
//!   addresses, statuses and timestamps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
