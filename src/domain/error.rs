//! Domain error types.

/// Broad classification of an [`AdvisorError`].
///
/// Callers use this to decide whether changing the request can help:
/// validation errors are caller mistakes, data-quality errors ask for a
/// longer or cleaner window, degenerate errors come from the weights a
/// policy or rule produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DataQuality,
    Degenerate,
    Collaborator,
    Config,
    Io,
}

/// Top-level error type for folioadvisor.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("asset universe is empty")]
    EmptyUniverse,

    #[error("empty symbol in asset list")]
    EmptySymbol,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("unknown risk tier: {0}")]
    UnknownRiskTier(String),

    #[error("weights reference [{}] but return series has [{}]", .weights.join(", "), .series.join(", "))]
    DimensionMismatch {
        weights: Vec<String>,
        series: Vec<String>,
    },

    #[error("invalid weight specification: {reason}")]
    InvalidWeight { reason: String },

    #[error("invalid client profile: {reason}")]
    ProfileInvalid { reason: String },

    #[error("invalid adjustment rule {rule}: {reason}")]
    RuleInvalid { rule: String, reason: String },

    #[error("insufficient data for {symbol}: have {points} usable points, need {minimum}")]
    InsufficientData {
        symbol: String,
        points: usize,
        minimum: usize,
    },

    #[error("assets [{}] share only {common_dates} aligned dates", .symbols.join(", "))]
    MisalignedData {
        symbols: Vec<String>,
        common_dates: usize,
    },

    #[error("insufficient history: have {periods} return periods, need {minimum}")]
    InsufficientHistory { periods: usize, minimum: usize },

    #[error("degenerate weights: {reason}")]
    DegenerateWeight { reason: String },

    #[error("price data provider error: {reason}")]
    DataProvider { reason: String },

    #[error("client profile not found: {name}")]
    ProfileNotFound { name: String },

    #[error("profile store is read-only")]
    ProfileStoreReadOnly,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AdvisorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdvisorError::EmptyUniverse
            | AdvisorError::EmptySymbol
            | AdvisorError::DuplicateSymbol(_)
            | AdvisorError::UnknownRiskTier(_)
            | AdvisorError::DimensionMismatch { .. }
            | AdvisorError::InvalidWeight { .. }
            | AdvisorError::ProfileInvalid { .. }
            | AdvisorError::RuleInvalid { .. } => ErrorKind::Validation,
            AdvisorError::InsufficientData { .. }
            | AdvisorError::MisalignedData { .. }
            | AdvisorError::InsufficientHistory { .. } => ErrorKind::DataQuality,
            AdvisorError::DegenerateWeight { .. } => ErrorKind::Degenerate,
            AdvisorError::DataProvider { .. }
            | AdvisorError::ProfileNotFound { .. }
            | AdvisorError::ProfileStoreReadOnly => ErrorKind::Collaborator,
            AdvisorError::ConfigParse { .. }
            | AdvisorError::ConfigMissing { .. }
            | AdvisorError::ConfigInvalid { .. } => ErrorKind::Config,
            AdvisorError::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<&AdvisorError> for std::process::ExitCode {
    fn from(err: &AdvisorError) -> Self {
        let code: u8 = match err.kind() {
            ErrorKind::Io => 1,
            ErrorKind::Config => 2,
            ErrorKind::Collaborator => 3,
            ErrorKind::Validation => 4,
            ErrorKind::DataQuality => 5,
            ErrorKind::Degenerate => 6,
        };
        std::process::ExitCode::from(code)
    }
}
