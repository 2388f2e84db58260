//! Domain-level error taxonomy for RL-Vis.

use rlvis_state::StorageError;

/// Input rejected before anything is merged or persisted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("file '{file}' is missing required columns: {}", .missing.join(", "))]
    MissingColumns { file: String, missing: Vec<String> },

    #[error("file '{file}' row {row}: cannot parse {column} value '{value}'")]
    MalformedCell {
        file: String,
        /// 1-based data row, header excluded
        row: usize,
        column: String,
        value: String,
    },

    #[error("file '{file}' could not be read: {reason}")]
    UnreadableFile { file: String, reason: String },

    #[error("upload at least one file")]
    EmptyUpload,

    #[error("run name must not be empty")]
    EmptyRunName,

    #[error("{parameter} must be between {min} and {max}, got {value}")]
    OutOfRange {
        parameter: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
}

/// RL-Vis domain errors.
#[derive(Debug, thiserror::Error)]
pub enum RlvisError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// One entry per offending file; nothing from the batch was kept
    #[error("ingest rejected: {}", join_errors(.0))]
    IngestRejected(Vec<ValidationError>),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<StorageError> for RlvisError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::RunNotFound { run_id } => RlvisError::RunNotFound(run_id),
            StorageError::DuplicateOwner { email } => {
                RlvisError::Conflict(format!("owner already exists: {email}"))
            }
            StorageError::InvalidCredentials => RlvisError::InvalidCredentials,
            other => RlvisError::Storage(other.to_string()),
        }
    }
}

/// Result type for RL-Vis domain operations.
pub type Result<T> = std::result::Result<T, RlvisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_names_file_and_columns() {
        let err = ValidationError::MissingColumns {
            file: "dqn.csv".to_string(),
            missing: vec!["confidence_metric".to_string(), "timestep".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dqn.csv"));
        assert!(msg.contains("confidence_metric, timestep"));
    }

    #[test]
    fn ingest_rejected_lists_every_file() {
        let err = RlvisError::IngestRejected(vec![
            ValidationError::MissingColumns {
                file: "a.csv".to_string(),
                missing: vec!["timestep".to_string()],
            },
            ValidationError::UnreadableFile {
                file: "b.csv".to_string(),
                reason: "bad utf-8".to_string(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("a.csv"));
        assert!(msg.contains("b.csv"));
    }

    #[test]
    fn storage_errors_map_to_domain_errors() {
        let err: RlvisError = StorageError::RunNotFound {
            run_id: "r1".to_string(),
        }
        .into();
        assert!(matches!(err, RlvisError::RunNotFound(id) if id == "r1"));

        let err: RlvisError = StorageError::DuplicateOwner {
            email: "x@y.z".to_string(),
        }
        .into();
        assert!(matches!(err, RlvisError::Conflict(_)));

        let err: RlvisError = StorageError::Backend("down".to_string()).into();
        assert!(err.to_string().contains("down"));
    }
}
