use crate::domain::model::{
    MemberId, NetworkMember, NewObjectRecord, ObjectId, ObjectMetadata, RelationLink, StoredFile,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of truth for network membership.
#[async_trait]
pub trait NetworkDirectory: Send + Sync {
    async fn members(&self) -> Result<Vec<NetworkMember>>;
}

/// Per-member byte storage. Every call names its target explicitly.
#[async_trait]
pub trait TargetStorage: Send + Sync {
    async fn write_file(&self, member: MemberId, file_name: &str, data: &[u8])
        -> Result<StoredFile>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(&self, member: MemberId, record: NewObjectRecord) -> Result<ObjectId>;

    async fn attach_metadata(
        &self,
        member: MemberId,
        object: ObjectId,
        metadata: ObjectMetadata,
    ) -> Result<()>;
}

#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn generate(
        &self,
        object: ObjectId,
        stored: &StoredFile,
        mime_type: &str,
    ) -> Result<ObjectMetadata>;
}

/// Optional cross-member relation capability.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// An installed store may still be switched off at runtime.
    fn is_available(&self) -> bool {
        true
    }

    /// Objects linked to `object` on `member`, keyed by the other member's id.
    async fn linked_objects(
        &self,
        member: MemberId,
        object: ObjectId,
    ) -> Result<HashMap<MemberId, ObjectId>>;

    async fn set_relation(&self, link: RelationLink) -> Result<()>;
}
