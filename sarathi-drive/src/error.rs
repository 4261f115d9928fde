//! Error types for SarathiDrive

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SarathiDrive error types
///
/// Startup failures (discovery, connect, missing controller, bad arguments)
/// are fatal. Failures of a single toy command during the control loop are
/// [`Error::Actuator`] and only cost that one call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No toy answered to the requested name
    #[error("No toy named '{0}' found")]
    ToyNotFound(String),

    /// Scan finished without seeing any toy
    #[error("No toys found")]
    NoToysFound,

    /// Toy was found but a command session could not be opened
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A single toy command or query failed
    #[error("Toy command '{op}' failed: {reason}")]
    Actuator {
        /// Operation name (e.g. "set_heading")
        op: &'static str,
        /// Transport-level reason
        reason: String,
    },

    /// Toy link dropped; nothing further can be sent this session
    #[error("Toy disconnected: {0}")]
    Disconnected(String),

    /// No usable controller
    #[error("No controller available: {0}")]
    InputUnavailable(String),

    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a recoverable actuator failure
    pub fn actuator(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Actuator {
            op,
            reason: reason.into(),
        }
    }

    /// Whether this error ends the session.
    ///
    /// Only [`Error::Actuator`] is recoverable; everything else either
    /// aborts startup or tears the running session down.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Actuator { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
