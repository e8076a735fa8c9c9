use regex::Regex;
use std::sync::LazyLock;

/// Title and year taken from a `<category>/<title> (<year>)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub title: String,
    pub year: i32,
}

// Searched rather than anchored, so `movies/Heat (1995).mkv` still parses.
// Years are ASCII digits only; `\d` would also accept other scripts' digits.
static RE_TITLE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w*/(.+) \(([0-9]+)\)").unwrap());

/// Extract title and year from a relative media key.
///
/// Returns `None` when the key doesn't follow the naming convention or the
/// year doesn't fit an integer.
pub fn parse_media_key(key: &str) -> Option<ParsedName> {
    let caps = RE_TITLE_YEAR.captures(key)?;
    let title = caps.get(1)?.as_str().to_string();
    let year = caps.get(2)?.as_str().parse().ok()?;
    Some(ParsedName { title, year })
}
