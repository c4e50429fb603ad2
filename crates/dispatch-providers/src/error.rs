use thiserror::Error;

/// Errors from any upstream data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure, or a non-2xx status surfaced by `error_for_status`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered 2xx but reported a failure in its body.
    #[error("{service} returned status {status}: {message}")]
    UpstreamStatus {
        service: &'static str,
        status: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The provider needs an API key that is not configured.
    #[error("{0} requires GOOGLE_MAPS_API_KEY")]
    MissingApiKey(&'static str),

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// No Environment Canada forecast station could be matched.
    #[error("no weather station found for '{0}'")]
    NoWeatherStation(String),
}

/// Errors from the geocoder adapter.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("place name must not be empty")]
    EmptyQuery,

    /// No source returned a usable coordinate.
    #[error("location not found: {0}")]
    NotFound(String),
}
