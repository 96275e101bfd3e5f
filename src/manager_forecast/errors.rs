use std::fmt;
use std::fmt::Formatter;

/// A forecast sample that lacks the time or temperature values needed to place it in a day
///
#[derive(Debug)]
pub struct MalformedSampleError(pub String);

impl fmt::Display for MalformedSampleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MalformedSampleError: {}", self.0)
    }
}
