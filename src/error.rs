use thiserror::Error;

/// Failures that abort a whole mailbox fetch.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Invalid server address '{0}'")]
    InvalidAddress(String),

    #[error("Failed to connect to {addr}: {source}")]
    Network {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {server} failed: {source}")]
    Tls {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Failed to select mailbox '{mailbox}': {reason}")]
    Select { mailbox: String, reason: String },

    #[error("Failed to search emails: {0}")]
    Search(String),
}

/// Failures of a single chat-completion request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No API token configured")]
    MissingToken,

    #[error("Failed to send chat request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Chat API error ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed chat response: {0}")]
    Malformed(String),
}
