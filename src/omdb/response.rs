use serde::Deserialize;

use super::MediaMetadata;

/// OMDb's JSON body. Every value arrives as a string, and a missing title
/// comes back as `200 OK` with `Error` set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmdbResponse {
    #[serde(rename = "Error")]
    pub error: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Runtime")]
    pub runtime: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "Metascore")]
    pub metascore: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
}

/// OMDb's placeholder for an unknown value.
const NOT_AVAILABLE: &str = "N/A";

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

impl OmdbResponse {
    /// The in-band "not found" message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Metadata from the plain lookup plus the plot of the `plot=full` lookup.
    pub fn into_metadata(self, full_plot: Option<String>) -> MediaMetadata {
        MediaMetadata {
            imdb_id: present(self.imdb_id),
            year: present(self.year),
            runtime: present(self.runtime),
            genre: present(self.genre),
            director: present(self.director),
            actors: present(self.actors),
            short_plot: present(self.plot),
            full_plot: present(full_plot),
            poster: present(self.poster),
            metascore: present(self.metascore).and_then(|m| m.parse().ok()),
            imdb_rating: present(self.imdb_rating).and_then(|r| r.parse().ok()),
            kind: present(self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIEN_JSON: &str = r#"{
        "Title": "Alien",
        "Year": "1979",
        "Rated": "R",
        "Runtime": "117 min",
        "Genre": "Horror, Sci-Fi",
        "Director": "Ridley Scott",
        "Actors": "Sigourney Weaver, Tom Skerritt, John Hurt",
        "Plot": "The crew of a commercial spacecraft encounters a deadly lifeform.",
        "Poster": "https://m.media-amazon.com/images/M/alien.jpg",
        "Metascore": "89",
        "imdbRating": "8.5",
        "imdbID": "tt0078748",
        "Type": "movie",
        "Response": "True"
    }"#;

    #[test]
    fn test_found_response_into_metadata() {
        let response: OmdbResponse = serde_json::from_str(ALIEN_JSON).unwrap();
        assert_eq!(response.error_message(), None);

        let metadata = response.into_metadata(Some("A longer plot.".to_string()));
        assert_eq!(metadata.imdb_id.as_deref(), Some("tt0078748"));
        assert_eq!(metadata.year.as_deref(), Some("1979"));
        assert_eq!(metadata.runtime.as_deref(), Some("117 min"));
        assert_eq!(metadata.director.as_deref(), Some("Ridley Scott"));
        assert_eq!(metadata.full_plot.as_deref(), Some("A longer plot."));
        assert_eq!(metadata.metascore, Some(89));
        assert_eq!(metadata.imdb_rating, Some(8.5));
        assert_eq!(metadata.kind.as_deref(), Some("movie"));
    }

    #[test]
    fn test_not_found_response() {
        let response: OmdbResponse =
            serde_json::from_str(r#"{"Response":"False","Error":"Movie not found!"}"#).unwrap();
        assert_eq!(response.error_message(), Some("Movie not found!"));
    }

    #[test]
    fn test_not_available_values_are_none() {
        let response: OmdbResponse = serde_json::from_str(
            r#"{
                "Year": "2003",
                "Director": "N/A",
                "Poster": "N/A",
                "Metascore": "N/A",
                "imdbRating": "N/A",
                "Plot": ""
            }"#,
        )
        .unwrap();

        let metadata = response.into_metadata(Some("N/A".to_string()));
        assert_eq!(metadata.year.as_deref(), Some("2003"));
        assert_eq!(metadata.director, None);
        assert_eq!(metadata.poster, None);
        assert_eq!(metadata.metascore, None);
        assert_eq!(metadata.imdb_rating, None);
        assert_eq!(metadata.short_plot, None);
        assert_eq!(metadata.full_plot, None);
    }
}
