use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use mediasync::{logging, Config, Database, MediaRecord, OmdbClient, Synchronizer};

#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    verbose: bool,
    list: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("mediasync {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                parsed.verbose = true;
            }
            "--list" | "-l" => {
                parsed.list = true;
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"mediasync - record new movies and shows with their OMDb metadata

USAGE:
    mediasync [OPTIONS]

OPTIONS:
    --verbose, -v       Mirror log lines to standard output
    --list, -l          Print stored records sorted by title and exit
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    MEDIASYNC_CONFIG    Path to config file (overrides default location)
    MEDIASYNC_LOG       Log level (trace, debug, info, warn, error)
    OMDB_API_KEY        OMDb API key (overrides omdb.api_key and omdb.api_key_file)

Config file location: $XDG_CONFIG_HOME/mediasync/config.toml"#
    );
}

/// Listing lines for the database at `db_path`, opened read-only. A database
/// that doesn't exist yet, or was never initialized, has nothing to list.
fn listing(db_path: &Path) -> Result<Vec<String>> {
    let db = match Database::open_read_only(db_path)? {
        Some(db) => db,
        None => return Ok(Vec::new()),
    };
    if !db.has_media_table()? {
        return Ok(Vec::new());
    }
    Ok(db.records()?.iter().map(format_listing).collect())
}

fn format_listing(record: &MediaRecord) -> String {
    format!(
        "{} ({}) {}  {}",
        record.title,
        record.filename_year,
        record.metadata.imdb_id.as_deref().unwrap_or("-"),
        record.filename
    )
}

fn sync(config: &Config) -> Result<()> {
    let client = OmdbClient::from_config(&config.omdb)?;

    let mut db = Database::open(&config.db_path)?;
    db.initialize()?;

    let report = Synchronizer::new(&mut db, &client, &config.library)
        .with_pacing(config.omdb.pacing())
        .run()?;

    info!(
        "Sync complete: {} candidate(s), {} added ({} without metadata), {} skipped",
        report.candidates,
        report.inserted,
        report.partial,
        report.skipped()
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    // Listing never writes, so it doesn't create a missing config file either
    match (&args.config_path, args.list) {
        (Some(path), true) => Config::read_from(path),
        (Some(path), false) => Config::load_from(path),
        (None, true) => Config::read(),
        (None, false) => Config::load(),
    }
}

fn main() -> ExitCode {
    let args = parse_args();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.list {
        return match listing(&config.db_path) {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    // Flushes the log file when dropped, including on the error path below
    let _log = match logging::init(&config.log.file, args.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // The stderr log layer already shows this, so nothing else is printed
    if let Err(e) = sync(&config) {
        error!("Sync aborted: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
