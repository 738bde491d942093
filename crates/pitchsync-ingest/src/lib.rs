//! Ingestion pipeline for pitchsync: walks OpenFootball-style data
//! repositories, parses club, fixture, and squad files, resolves team
//! identities, and incrementally upserts everything into the core
//! database.
//!
//! The crate splits along the pipeline's seams: [`classify`] routes
//! files, [`parsers`] turn them into [`record`] types, [`resolve`]
//! persists records with identity resolution, [`sync`] drives
//! hash-based incremental runs, and [`repair`] cleans up after
//! resolution misfires.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod classify;
pub mod config;
pub mod dates;
pub mod error;
pub mod mapper;
pub mod parsers;
pub mod record;
pub mod repair;
pub mod resolve;
pub mod state;
pub mod sync;

pub use config::Config;
pub use error::{IngestError, IngestResult};
pub use mapper::TeamMapper;
pub use repair::{run_repair, RepairReport};
pub use sync::{run_sync, SyncOptions, SyncStats};
