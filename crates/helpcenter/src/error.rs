/// Failures of the Intercom client.
///
/// Request failures are only told apart by whether the request completed: a
/// transport problem ([`Error::Request`]) or a response the API rejected
/// ([`Error::Status`]).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Intercom API error [{status}] for {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },
}

impl Error {
    pub fn request(url: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Request {
            url: url.to_string(),
            source: source.into(),
        }
    }
}
