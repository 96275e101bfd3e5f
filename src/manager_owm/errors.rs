use std::fmt;

#[derive(Debug)]
pub enum OWMError {
    MissingApiKey,
    NotFound(String),
    Upstream(String),
    Document(String),
}

impl fmt::Display for OWMError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OWMError::MissingApiKey => write!(f, "OWMError::MissingApiKey: no OpenWeatherMap API key configured"),
            OWMError::NotFound(e) => write!(f, "OWMError::NotFound: {}", e),
            OWMError::Upstream(e) => write!(f, "OWMError::Upstream: {}", e),
            OWMError::Document(e) => write!(f, "OWMError::Document: {}", e),
        }
    }
}
impl From<reqwest::Error> for OWMError {
    fn from(e: reqwest::Error) -> Self {
        OWMError::Upstream(e.to_string())
    }
}
impl From<serde_json::Error> for OWMError {
    fn from(e: serde_json::Error) -> Self {
        OWMError::Document(e.to_string())
    }
}
