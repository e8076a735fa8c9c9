pub const SCHEMA: &str = r#"
-- One row per media file or folder
CREATE TABLE IF NOT EXISTS media (
    filename        TEXT UNIQUE,   -- Relative key, e.g. 'movies/Alien (1979)'
    filenameyear    INTEGER,       -- Year parsed from the filename
    imdbid          TEXT,
    title           TEXT,          -- Title parsed from the filename
    titlenormalized TEXT,          -- ASCII-folded sort key
    year            TEXT,
    runtime         TEXT,
    genre           TEXT,
    director        TEXT,
    actors          TEXT,
    shortplot       TEXT,
    fullplot        TEXT,
    poster          TEXT,
    metascore       INTEGER,
    imdbrating      REAL,
    type            TEXT,
    dateadded       INTEGER        -- Seconds since epoch
);

CREATE INDEX IF NOT EXISTS idx_media_titlenormalized ON media(titlenormalized);
"#;
