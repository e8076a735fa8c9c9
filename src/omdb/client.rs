use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use super::{FetchError, Lookup, MetadataSource, OmdbResponse};
use crate::config::OmdbConfig;

/// Blocking OMDb client. One lookup is two requests: the default short plot
/// and the `plot=full` variant.
pub struct OmdbClient {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();

        Self {
            agent,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create a client from configuration, resolving the API key.
    pub fn from_config(config: &OmdbConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self::new(&config.endpoint, &api_key, config.timeout()))
    }

    fn fetch(&self, title: &str, year: &str, full_plot: bool) -> Result<OmdbResponse, FetchError> {
        let mut request = self
            .agent
            .get(&self.endpoint)
            .query("apikey", &self.api_key)
            .query("t", title)
            .query("y", year);

        if full_plot {
            request = request.query("plot", "full");
        }

        debug!(endpoint = %self.endpoint, title, year, full_plot, "OMDb request");

        let response = request.call()?;
        response
            .into_json::<OmdbResponse>()
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl MetadataSource for OmdbClient {
    fn lookup(&self, title: &str, year: i32) -> Result<Lookup, FetchError> {
        let year = year.to_string();
        info!("Fetching {} ({}) from {}", title, year, self.endpoint);

        let short = self.fetch(title, &year, false)?;
        let full = self.fetch(title, &year, true)?;

        if let Some(message) = short.error_message() {
            return Ok(Lookup::NotFound(message.to_string()));
        }

        // A failed second lookup only costs the long plot
        let full_plot = match full.error_message() {
            Some(_) => None,
            None => full.plot,
        };

        Ok(Lookup::Found(short.into_metadata(full_plot)))
    }

    fn source_name(&self) -> &'static str {
        "OMDb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned `(status, body)` reply per connection and report each
    /// request line.
    fn serve(replies: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let request = String::from_utf8_lossy(&request);
                let _ = tx.send(request.lines().next().unwrap_or_default().to_string());

                let reply = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });

        (endpoint, rx)
    }

    #[test]
    fn test_lookup_makes_short_then_full_request() {
        let (endpoint, requests) = serve(vec![
            (200, r#"{"imdbID":"tt0078748","Year":"1979","Plot":"Short.","Type":"movie"}"#),
            (200, r#"{"imdbID":"tt0078748","Year":"1979","Plot":"Much longer.","Type":"movie"}"#),
        ]);

        let client = OmdbClient::new(&endpoint, "KEY", Duration::from_secs(5));
        let lookup = client.lookup("Alien", 1979).unwrap();

        let first = requests.recv().unwrap();
        let second = requests.recv().unwrap();
        assert!(first.starts_with("GET /?"));
        assert!(first.contains("apikey=KEY"));
        assert!(first.contains("t=Alien"));
        assert!(first.contains("y=1979"));
        assert!(!first.contains("plot=full"));
        assert!(second.contains("plot=full"));

        match lookup {
            Lookup::Found(metadata) => {
                assert_eq!(metadata.imdb_id.as_deref(), Some("tt0078748"));
                assert_eq!(metadata.short_plot.as_deref(), Some("Short."));
                assert_eq!(metadata.full_plot.as_deref(), Some("Much longer."));
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_not_found() {
        let (endpoint, _requests) = serve(vec![
            (200, r#"{"Response":"False","Error":"Movie not found!"}"#),
            (200, r#"{"Response":"False","Error":"Movie not found!"}"#),
        ]);

        let client = OmdbClient::new(&endpoint, "KEY", Duration::from_secs(5));
        let lookup = client.lookup("Nonexistent", 2099).unwrap();

        assert_eq!(lookup, Lookup::NotFound("Movie not found!".to_string()));
    }

    #[test]
    fn test_unparsable_body_is_decode_error() {
        let (endpoint, _requests) = serve(vec![(200, "<html>oops</html>")]);

        let client = OmdbClient::new(&endpoint, "KEY", Duration::from_secs(5));
        let err = client.lookup("Alien", 1979).unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_missing_full_plot_keeps_short_metadata() {
        let (endpoint, _requests) = serve(vec![
            (200, r#"{"imdbID":"tt0078748","Year":"1979","Plot":"Short.","Director":"Ridley Scott"}"#),
            (200, r#"{"Response":"False","Error":"Movie not found!"}"#),
        ]);

        let client = OmdbClient::new(&endpoint, "KEY", Duration::from_secs(5));
        let lookup = client.lookup("Alien", 1979).unwrap();

        match lookup {
            Lookup::Found(metadata) => {
                assert_eq!(metadata.imdb_id.as_deref(), Some("tt0078748"));
                assert_eq!(metadata.year.as_deref(), Some("1979"));
                assert_eq!(metadata.director.as_deref(), Some("Ridley Scott"));
                assert_eq!(metadata.short_plot.as_deref(), Some("Short."));
                assert_eq!(metadata.full_plot, None);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_error_status_is_reported() {
        let (endpoint, _requests) = serve(vec![(
            401,
            r#"{"Response":"False","Error":"Invalid API key!"}"#,
        )]);

        let client = OmdbClient::new(&endpoint, "WRONG", Duration::from_secs(5));
        let err = client.lookup("Alien", 1979).unwrap_err();

        assert!(matches!(err, FetchError::Status(401)));
    }

    #[test]
    fn test_unresponsive_server_times_out() {
        // Accepts connections via the backlog but never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/", listener.local_addr().unwrap());

        let client = OmdbClient::new(&endpoint, "KEY", Duration::from_millis(200));
        let err = client.lookup("Alien", 1979).unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        drop(listener);
    }
}
