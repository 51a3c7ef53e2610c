//! Domain error types.

/// Top-level error type for the liquidity crate.
#[derive(Debug, thiserror::Error)]
pub enum LiquidityError {
    #[error("no {kind} data available for {symbol}")]
    DataNotAvailable { symbol: String, kind: String },

    #[error("missing definition for: {symbol}")]
    UnknownInstrument { symbol: String },

    #[error("unusable metadata for {symbol}: {reason}")]
    InvalidMetadata { symbol: String, reason: String },

    #[error("date index must be ascending for {context}")]
    OrderingViolation { context: String },

    #[error("currency conversion from {from} to {to} not supported")]
    UnsupportedConversion { from: String, to: String },

    #[error("missing column: {column}")]
    MissingColumn { column: String },

    #[error("malformed value in column {column}: {reason}")]
    MalformedInput { column: String, reason: String },

    #[error("failed to read table {path}: {reason}")]
    TableRead { path: String, reason: String },

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

impl From<&LiquidityError> for std::process::ExitCode {
    fn from(err: &LiquidityError) -> Self {
        let code: u8 = match err {
            LiquidityError::Io(_) | LiquidityError::TableRead { .. } => 1,
            LiquidityError::ConfigParse { .. } | LiquidityError::ConfigInvalid { .. } => 2,
            LiquidityError::DataNotAvailable { .. }
            | LiquidityError::UnknownInstrument { .. }
            | LiquidityError::InvalidMetadata { .. } => 3,
            LiquidityError::OrderingViolation { .. }
            | LiquidityError::UnsupportedConversion { .. }
            | LiquidityError::MissingColumn { .. }
            | LiquidityError::MalformedInput { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
