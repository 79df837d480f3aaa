//! Domain error types.

/// Expected outcome of a trade request that could not be executed.
///
/// These are returned as values and reported to the user; none of them
/// leave partial state behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeRejection {
    #[error("insufficient cash: need {needed:.2}, have {available:.2}")]
    InsufficientCash { needed: f64, available: f64 },

    #[error("insufficient shares of {symbol}: hold {held}, requested {requested}")]
    InsufficientShares {
        symbol: String,
        held: u32,
        requested: u32,
    },

    #[error("cannot hold more than {max} shares of {symbol}: hold {held}, requested {requested}")]
    PositionLimit {
        symbol: String,
        held: u32,
        requested: u32,
        max: u32,
    },

    #[error("no position in {symbol}")]
    NoPosition { symbol: String },

    #[error("unknown ticker {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("quantity must be greater than zero")]
    ZeroQuantity,
}

/// Top-level error type for stockdesk.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("failed to read {file}: {reason}")]
    Read { file: String, reason: String },

    #[error("failed to write {file}: {reason}")]
    Write { file: String, reason: String },

    #[error("malformed row in {file} at line {line}: {reason}")]
    MalformedRow {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. } | TraderError::ConfigInvalid { .. } => 2,
            TraderError::Read { .. } | TraderError::Write { .. } => 3,
            TraderError::MalformedRow { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
