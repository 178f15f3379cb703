use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PatternError>;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Singleton registry holds an instance of the wrong type for '{type_name}'")]
    SingletonTypeMismatch { type_name: &'static str },

    #[error("Failed to render state as JSON: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to spawn demo thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("Demo thread '{0}' panicked")]
    Thread(String),
}

impl PatternError {
    pub fn config_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ConfigRead {
            path: path.into(),
            source,
        }
    }

    pub fn type_mismatch<T>() -> Self {
        Self::SingletonTypeMismatch {
            type_name: std::any::type_name::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_names_type() {
        let err = PatternError::type_mismatch::<String>();
        assert!(err.to_string().contains("alloc::string::String"));
    }

    #[test]
    fn test_config_read_mentions_path() {
        let err = PatternError::config_read(
            "/nowhere/demos.toml",
            io::Error::new(io::ErrorKind::NotFound, "missing"),
        );
        let message = err.to_string();
        assert!(message.contains("/nowhere/demos.toml"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_parse_error_converts() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: PatternError = toml_err.into();
        assert!(matches!(err, PatternError::ConfigParse(_)));
    }
}
