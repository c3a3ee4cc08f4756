use crate::config::ConfigError;
use crate::engine::parsing::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(value: E) -> Self {
        Error(Box::new(value.into()))
    }
}

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorKind {
    /// The query document could not be parsed.
    #[error("Failed to parse query: {0}")]
    ParseError(#[from] ParseError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] ConfigError),
    /// Serializing output or reading the config file.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub fn into_inner(self) -> ErrorKind {
        *self.0
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::ParseError(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    #[test]
    fn io_errors_are_kept_unchanged() {
        let error: Error = io::Error::new(io::ErrorKind::NotFound, "missing.json").into();

        match error.into_inner() {
            ErrorKind::IoError(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected an IO error, got {other:?}"),
        }
    }

    #[test]
    fn parse_errors_are_recognizable() {
        let error: Error = ParseError::NotAQuery("a string").into();

        assert!(error.is_parse_error());
        assert!(error.to_string().starts_with("Failed to parse query: "));
    }
}
