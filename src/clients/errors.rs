use rspotify::{ClientError, model::IdError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    #[error("Invalid Spotify id or uri: {0}")]
    InvalidId(#[from] IdError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown playlist: {0}")]
    UnknownPlaylist(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Music service error: {0}")]
    Service(String),

    // Chunks before the failing one stay in the playlist
    #[error("Some items may not have been added: wrote {written} of {total} before failing: {source}")]
    PartialWrite {
        written: usize,
        total: usize,
        source: Box<Error>,
    },
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_failures_are_configuration_errors() {
        let err = Error::from(std::env::VarError::NotPresent);
        assert!(matches!(err, Error::ConfigurationError(_)));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, ".env not readable");
        match Error::from(io) {
            Error::ConfigurationError(msg) => assert!(msg.contains(".env not readable")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
