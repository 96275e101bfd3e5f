use std::fmt;
use std::fmt::Formatter;

#[derive(Debug)]
pub enum HistoryError {
    Validation(String),
    Storage(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Validation(e) => write!(f, "HistoryError::Validation: {}", e),
            HistoryError::Storage(e) => write!(f, "HistoryError::Storage: {}", e),
        }
    }
}
impl From<rusqlite::Error> for HistoryError {
    fn from(e: rusqlite::Error) -> Self { HistoryError::Storage(e.to_string()) }
}
