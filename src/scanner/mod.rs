pub mod discovery;
pub mod normalize;
pub mod parse;

pub use discovery::{find_candidates, list_media_entries};
pub use normalize::normalize_title;
pub use parse::{parse_media_key, ParsedName};
