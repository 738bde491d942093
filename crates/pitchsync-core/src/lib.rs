//! Core domain model for pitchsync.
//!
//! This crate defines the football data model (Club, Team, Competition,
//! Season, Fixture, MatchResult, Player, Ground, Group), the SQLite
//! schema, and the ingestion audit log that the sync driver writes.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
pub use schema::{Database, FixtureDetail};
