use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReplicationError {
    #[error("Network enumeration failed: {message}")]
    Enumeration { message: String },

    #[error("Replication already in progress for this engine")]
    AlreadyReplicating,

    #[error("Storage write failed on member {member_id}: {message}")]
    Storage { member_id: u64, message: String },

    #[error("Record creation failed on member {member_id}: {message}")]
    Record { member_id: u64, message: String },

    #[error("Metadata generation failed for object {object_id}: {message}")]
    Metadata { object_id: u64, message: String },

    #[error("Relation error: {message}")]
    Relation { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ReplicationError {
    /// Errors that abort a whole `replicate` call rather than a single target.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReplicationError::Enumeration { .. }
                | ReplicationError::AlreadyReplicating
                | ReplicationError::Config { .. }
                | ReplicationError::InvalidConfigValue { .. }
        )
    }

    pub fn storage(member_id: u64, message: impl Into<String>) -> Self {
        ReplicationError::Storage {
            member_id,
            message: message.into(),
        }
    }

    pub fn record(member_id: u64, message: impl Into<String>) -> Self {
        ReplicationError::Record {
            member_id,
            message: message.into(),
        }
    }

    pub fn relation(message: impl Into<String>) -> Self {
        ReplicationError::Relation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReplicationError>;
