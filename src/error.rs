//! Error types for the sous gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway itself
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Session protocol error (malformed frames, closed channels)
    #[error("session error: {0}")]
    Session(String),

    /// Tool invocation failure
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Uniform failure kind surfaced at every tool boundary.
///
/// Every tool converts its internal failure into exactly one of these
/// variants with a human-readable message. Nothing is retried automatically;
/// the conversational layer decides whether to retry, ask the user, or move
/// on. The sole exception is the activity reporter, whose delivery failures
/// are logged and suppressed rather than surfaced here.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Upstream HTTP failure — status and body are relayed verbatim
    #[error("error: HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code returned by the provider
        status: u16,
        /// Response body, unmodified
        body: String,
    },

    /// The call exceeded its time box
    #[error("error: timed out after {0} seconds")]
    Timeout(u64),

    /// Transport-level failure (connect, DNS, TLS, stream)
    #[error("error: {0}")]
    Transport(String),

    /// Client Bridge precondition: no participant is linked to the session
    #[error("no linked participant found")]
    NoLinkedParticipant,

    /// The linked participant's RPC handler reported a failure
    #[error("error: {0}")]
    Rpc(String),

    /// Tool name not registered with the dispatcher
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments did not match the tool's schema
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool that rejected the arguments
        tool: String,
        /// Parse failure detail
        reason: String,
    },

    /// The conversational policy rejected the call for the current phase
    #[error("tool {tool} is not allowed yet: {reason}")]
    OutOfSequence {
        /// Tool that was rejected
        tool: String,
        /// Which pipeline precondition is unmet
        reason: String,
    },
}
