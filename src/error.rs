use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The store could not be opened or the window query failed.
    #[error("Storage unavailable ({context}): {source}")]
    StorageUnavailable {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A stored row has a field that can't be read as its expected type.
    #[error("Malformed reading in column '{column}' ({reason}): {row}")]
    MalformedReading {
        row: String,
        column: &'static str,
        reason: String,
    },

    /// Nothing was recorded in the window. Callers print a notice instead of a page.
    #[error("No data found")]
    EmptyWindow,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to read config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unable to listen on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: warp::Error,
    },

    #[error("Unable to serialize chart series: {0}")]
    Series(#[from] serde_json::Error),
}

impl ReportError {
    pub(crate) fn storage(context: impl Into<String>, source: rusqlite::Error) -> Self {
        ReportError::StorageUnavailable {
            context: context.into(),
            source,
        }
    }
}
