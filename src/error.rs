use thiserror::Error;

/// Errors that can occur while syncing snacks between the board and the backend
#[derive(Error, Debug)]
pub enum SyncError {
    /// An outbound HTTP call failed, including its single retry
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The board API answered with a non-success status
    #[error("board API returned status {status}: {message}")]
    Board { status: u16, message: String },

    /// The backend rejected a write or returned an unusable body
    #[error("backend returned status {status}: {message}")]
    Backend { status: u16, message: String },

    /// Upload to object storage failed
    #[error("object storage error: {0}")]
    Storage(String),

    /// The image catalog answered with a non-success status
    #[error("image catalog returned status {status}: {message}")]
    Catalog { status: u16, message: String },

    /// The image catalog has no rendition in the requested size
    #[error("URL for image size '{size}' is not present for photo {id}")]
    MissingRendition { id: String, size: String },

    /// A card carries no qualifying source attachment
    #[error("no valid source URL found in attachments of card '{0}'")]
    MissingSource(String),

    /// A required credential is absent from the configuration
    #[error("missing required credential: {0}")]
    MissingCredential(&'static str),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A response or input body could not be decoded
    #[error("malformed JSON body: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
