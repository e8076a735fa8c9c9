//! Keep a SQLite table of a movie/TV folder in sync with OMDb metadata.
//!
//! Entries directly under the category folders (`TV/`, `movies/` by default)
//! named `<title> (<year>)` are looked up once and recorded once.

pub mod config;
pub mod db;
pub mod logging;
pub mod omdb;
pub mod scanner;
pub mod sync;

pub use config::Config;
pub use db::{Database, MediaRecord};
pub use omdb::{MediaMetadata, MetadataSource, OmdbClient};
pub use sync::{SyncReport, Synchronizer};
