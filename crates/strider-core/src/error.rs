use thiserror::Error;

/// Top-level error type for the strider workspace.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] ConvergenceFailure),
}

/// Configuration errors. Fatal at startup: the control loop must never run
/// with incomplete leg definitions.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Missing leg definition: {0}")]
    MissingLeg(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

/// Command rejection at the dispatch boundary.
///
/// Invalid identifiers are reported to the issuer, never silently dropped,
/// and never reach the control tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown leg: {0}")]
    UnknownLeg(String),

    #[error("Unknown joint: {0}")]
    UnknownJoint(String),

    #[error("Unparseable command: {0}")]
    Unparseable(String),

    #[error("Control thread is no longer running")]
    Disconnected,
}

/// Inverse kinematics failed to produce a usable solution.
///
/// Recovered locally: the affected leg holds its previous angles for the
/// tick. Copy + static-ish payload for cheap propagation on the hot path.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConvergenceFailure {
    #[error("Jacobian is singular; pseudoinverse undefined")]
    Singular,

    #[error("Iteration budget exhausted; residual {residual}")]
    IterationsExhausted { residual: f64 },
}
