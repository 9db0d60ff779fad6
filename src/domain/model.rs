use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MemberId = u64;
pub type ObjectId = u64;

/// The uploaded artifact that triggers replication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    pub id: ObjectId,
    pub owner_member_id: MemberId,
    pub parent_object_id: Option<ObjectId>,
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkMember {
    pub id: MemberId,
}

impl NetworkMember {
    pub fn new(id: MemberId) -> Self {
        Self { id }
    }
}

/// Declares that `source_object_id` on the source member corresponds to
/// `target_object_id` on the target member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationLink {
    pub source_member_id: MemberId,
    pub target_member_id: MemberId,
    pub source_object_id: ObjectId,
    pub target_object_id: ObjectId,
}

/// Where a target storage placed the copied bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub member_id: MemberId,
    /// Final name, which may carry a uniqueness suffix.
    pub file_name: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectStatus {
    /// Authored directly on the member.
    Published,
    /// Copy of an object that originated on another member.
    Inherited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewObjectRecord {
    pub title: String,
    pub mime_type: String,
    pub parent_object_id: Option<ObjectId>,
    pub status: ObjectStatus,
    pub file_name: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRepresentation {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub size_bytes: u64,
    pub mime_type: String,
    pub derived: Vec<DerivedRepresentation>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeErrorKind {
    StorageWriteFailed,
    RecordCreationFailed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MetadataGenerationFailed,
    RelationLinkFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub kind: OutcomeErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeWarning {
    pub kind: WarningKind,
    pub message: String,
}

/// Result of replicating one source object onto one target member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationOutcome {
    pub target_member_id: MemberId,
    pub success: bool,
    pub created_object_id: Option<ObjectId>,
    pub error: Option<OutcomeError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<OutcomeWarning>,
}

impl ReplicationOutcome {
    pub fn succeeded(target_member_id: MemberId, created_object_id: ObjectId) -> Self {
        Self {
            target_member_id,
            success: true,
            created_object_id: Some(created_object_id),
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn failed(
        target_member_id: MemberId,
        kind: OutcomeErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target_member_id,
            success: false,
            created_object_id: None,
            error: Some(OutcomeError {
                kind,
                message: message.into(),
            }),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(OutcomeWarning {
            kind,
            message: message.into(),
        });
    }

    pub fn error_kind(&self) -> Option<OutcomeErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    /// The copy landed but an enhancement step (metadata, relation link) did not.
    pub fn degraded(&self) -> bool {
        self.success && !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplicationReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub degraded: usize,
    pub cancelled: usize,
}

impl ReplicationReport {
    pub fn from_outcomes(outcomes: &[ReplicationOutcome]) -> Self {
        let mut report = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            if outcome.success {
                report.succeeded += 1;
                if outcome.degraded() {
                    report.degraded += 1;
                }
            } else {
                report.failed += 1;
                if outcome.error_kind() == Some(OutcomeErrorKind::Cancelled) {
                    report.cancelled += 1;
                }
            }
        }
        report
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
