use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static RE_NOT_WORD_OR_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Fold a title into the ASCII-only form used as the sort key.
///
/// Diacritics are decomposed and dropped along with any other non-ASCII
/// character, punctuation is removed, and whitespace runs collapse to a
/// single space.
pub fn normalize_title(title: &str) -> String {
    let ascii: String = title.nfkd().filter(char::is_ascii).collect();
    let stripped = RE_NOT_WORD_OR_SPACE.replace_all(&ascii, "");
    RE_SPACE_RUN.replace_all(&stripped, " ").into_owned()
}
