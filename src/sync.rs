//! One synchronization run: discover new media, look each one up, record it.
//!
//! Per-file failures never abort the run. Files that can't be parsed or
//! fetched are skipped and stay candidates for the next run; titles the
//! metadata source doesn't know are recorded without metadata. Everything
//! inserted during a run is committed once at the end.

use anyhow::Result;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::LibraryConfig;
use crate::db::{Database, MediaRecord};
use crate::omdb::{Lookup, MetadataSource};
use crate::scanner::{find_candidates, parse_media_key};

/// Counts from a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub candidates: usize,
    pub inserted: usize,
    /// Inserted without metadata
    pub partial: usize,
    pub malformed: usize,
    pub fetch_failed: usize,
    pub insert_failed: usize,
}

impl SyncReport {
    pub fn skipped(&self) -> usize {
        self.malformed + self.fetch_failed + self.insert_failed
    }
}

/// Everything a run needs, passed in explicitly.
pub struct Synchronizer<'a> {
    db: &'a mut Database,
    source: &'a dyn MetadataSource,
    library: &'a LibraryConfig,
    pacing: Duration,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        db: &'a mut Database,
        source: &'a dyn MetadataSource,
        library: &'a LibraryConfig,
    ) -> Self {
        Self {
            db,
            source,
            library,
            pacing: Duration::from_secs(1),
        }
    }

    /// Delay after each inserted record.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn run(self) -> Result<SyncReport> {
        let tx = self.db.begin_sync()?;

        let known = tx.known_filenames()?;
        let candidates = find_candidates(self.library, &known);
        info!(
            "{} recorded, {} new candidate(s) under {:?}",
            known.len(),
            candidates.len(),
            self.library.root
        );

        let mut report = SyncReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for key in &candidates {
            let Some(parsed) = parse_media_key(key) else {
                warn!("{} is formatted wrong. Skipping.", key);
                report.malformed += 1;
                continue;
            };

            let lookup = match self.source.lookup(&parsed.title, parsed.year) {
                Ok(lookup) => lookup,
                Err(e) => {
                    warn!(
                        "{} error while looking up {} ({}), skipping: {}",
                        self.source.source_name(),
                        parsed.title,
                        parsed.year,
                        e
                    );
                    report.fetch_failed += 1;
                    continue;
                }
            };

            let date_added = chrono::Utc::now().timestamp();
            let partial = matches!(lookup, Lookup::NotFound(_));
            let record = match lookup {
                Lookup::Found(metadata) => MediaRecord::new(key, parsed, metadata, date_added),
                Lookup::NotFound(message) => {
                    warn!(
                        "No {} entry found for {} ({}): {}",
                        self.source.source_name(),
                        parsed.title,
                        parsed.year,
                        message
                    );
                    MediaRecord::partial(key, parsed, date_added)
                }
            };

            if let Err(e) = tx.insert(&record) {
                warn!("Failed to record {}, skipping: {}", key, e);
                report.insert_failed += 1;
                continue;
            }

            if partial {
                report.partial += 1;
            }
            report.inserted += 1;
            info!(
                "Added {} ({}) with imdbID {}",
                record.title,
                record.filename_year,
                record.metadata.imdb_id.as_deref().unwrap_or("None")
            );

            thread::sleep(self.pacing);
        }

        tx.commit()?;
        Ok(report)
    }
}
