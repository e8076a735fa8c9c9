//! Row type for the `media` table.

use rusqlite::types::ValueRef;
use rusqlite::Row;

use crate::omdb::MediaMetadata;
use crate::scanner::{normalize_title, ParsedName};

/// One stored media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub filename: String,
    pub filename_year: i32,
    pub title: String,
    pub title_normalized: String,
    pub metadata: MediaMetadata,
    pub date_added: i64,
}

impl MediaRecord {
    pub fn new(filename: &str, parsed: ParsedName, metadata: MediaMetadata, date_added: i64) -> Self {
        Self {
            filename: filename.to_string(),
            filename_year: parsed.year,
            title_normalized: normalize_title(&parsed.title),
            title: parsed.title,
            metadata,
            date_added,
        }
    }

    /// A record with no metadata, for titles the API doesn't know.
    pub fn partial(filename: &str, parsed: ParsedName, date_added: i64) -> Self {
        Self::new(filename, parsed, MediaMetadata::default(), date_added)
    }
}

pub(crate) const SELECT_COLUMNS: &str = "filename, filenameyear, imdbid, title, titlenormalized, \
     year, runtime, genre, director, actors, shortplot, fullplot, poster, metascore, imdbrating, \
     type, dateadded";

// Older rows may hold text such as 'N/A' in the numeric columns
fn lenient_i64(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        _ => None,
    }
}

fn lenient_f64(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        _ => None,
    }
}

/// Map a row selected with [`SELECT_COLUMNS`].
pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<MediaRecord> {
    Ok(MediaRecord {
        filename: row.get(0)?,
        filename_year: lenient_i64(row.get_ref(1)?).unwrap_or_default() as i32,
        title: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        title_normalized: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        metadata: MediaMetadata {
            imdb_id: row.get(2)?,
            year: row.get(5)?,
            runtime: row.get(6)?,
            genre: row.get(7)?,
            director: row.get(8)?,
            actors: row.get(9)?,
            short_plot: row.get(10)?,
            full_plot: row.get(11)?,
            poster: row.get(12)?,
            metascore: lenient_i64(row.get_ref(13)?),
            imdb_rating: lenient_f64(row.get_ref(14)?),
            kind: row.get(15)?,
        },
        date_added: lenient_i64(row.get_ref(16)?).unwrap_or_default(),
    })
}
