//! Metadata lookups against OMDb (the Open Movie Database).

pub mod client;
pub mod response;

use thiserror::Error;

pub use client::OmdbClient;
pub use response::OmdbResponse;

/// Metadata for one title. Every field is optional: absent values and
/// OMDb's `"N/A"` placeholder are both `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaMetadata {
    pub imdb_id: Option<String>,
    pub year: Option<String>,
    pub runtime: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub short_plot: Option<String>,
    pub full_plot: Option<String>,
    pub poster: Option<String>,
    pub metascore: Option<i64>,
    pub imdb_rating: Option<f64>,
    pub kind: Option<String>,
}

/// Outcome of a lookup that reached the API.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(MediaMetadata),
    /// OMDb answered but has no entry; carries its error message
    NotFound(String),
}

/// A lookup that never produced a usable answer. The file is retried on
/// the next run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("OMDb returned HTTP {0}")]
    Status(u16),

    #[error("failed to parse OMDb response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        }
    }
}

/// Something that can look up title metadata.
pub trait MetadataSource {
    /// Look up `title` released in `year`, including the long-form plot.
    fn lookup(&self, title: &str, year: i32) -> Result<Lookup, FetchError>;

    /// Name for log lines
    fn source_name(&self) -> &'static str;
}
