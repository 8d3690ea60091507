//! Error types.
//!
//! Only setup mistakes are errors. Bad input data never is: a malformed
//! table degrades to a minimal score so a batch of thousands of pairs keeps
//! running.

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A configuration mistake, reported before any pair is scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("threshold `{name}` must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("weight for {family} signal `{signal}` must be a finite value within [0, 1], got {value}")]
    InvalidWeight {
        family: &'static str,
        signal: String,
        value: f64,
    },

    #[error("missing weight for {family} signal `{signal}`")]
    MissingWeight {
        family: &'static str,
        signal: &'static str,
    },

    #[error("unknown {family} signal `{signal}`")]
    UnknownSignal { family: &'static str, signal: String },

    #[error("all {family} signal weights are zero")]
    NoPositiveWeight { family: &'static str },

    #[error("embedding batch size must be at least 1")]
    InvalidBatchSize,
}

/// Errors raised while building metadata objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error("duplicate column id `{column_id}` in table `{table_id}`")]
    DuplicateColumnId { table_id: String, column_id: String },
}

/// Errors from an embedding provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding provider failed: {0}")]
    Provider(String),

    #[error("embedding provider returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}
