//! UCI protocol errors.

/// Errors that can occur during UCI protocol handling.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command is missing `startpos` or `fen` keyword.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// Failed to parse a FEN string.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move in the `position` command is unparsable or illegal.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move string that was rejected.
        uci_move: String,
    },

    /// A `go` parameter was given without its value.
    #[error("missing value for go parameter `{param}`")]
    MissingGoValue {
        /// The parameter name.
        param: String,
    },

    /// A `go` parameter value could not be parsed.
    #[error("invalid value `{value}` for go parameter `{param}`")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The rejected value.
        value: String,
    },

    /// `setoption` named an option the engine does not have.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name as received.
        name: String,
    },

    /// `setoption` value missing or not an integer.
    #[error("invalid value `{value}` for option {name}")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// An I/O error occurred while reading from stdin.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
