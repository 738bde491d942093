//! Parsers for the raw file shapes, one module per [`FileKind`].
//!
//! All parsers share one contract: a malformed line is logged and
//! skipped, never fatal for the file; an unreadable file is an error
//! the sync driver catches per file. Parsers emit plain records and
//! leave persistence to the resolver.
//!
//! [`FileKind`]: crate::classify::FileKind

pub mod club_json;
pub mod club_text;
pub mod fixture_csv;
pub mod fixture_text;
pub mod squad_text;
