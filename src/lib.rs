//! Mapsnap
//!
//! Decoder for Mudlet binary map files (Qt data stream format, versions
//! 6 through 21, plus the old tagged format), with validation, statistics
//! and JSON export over the decoded map.

pub mod codec;
pub mod config;
pub mod error;
pub mod report;
pub mod state;
pub mod timeout;

pub use codec::{parse_document, parse_file, parse_reader, ParseOutcome};
pub use config::ParseOptions;
pub use error::{Error, Result};
pub use state::{Area, Direction, Document, Label, Room};
pub use timeout::parse_with_timeout;
