use thiserror::Error;

#[derive(Debug, Error)]
pub enum KanimeError {
    #[error("malformed value stored under {key:?}")]
    MalformedStorage {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode value for {key:?}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
