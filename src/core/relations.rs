use crate::core::RelationStore;
use crate::domain::model::{MemberId, ObjectId, RelationLink};
use crate::utils::error::{ReplicationError, Result};
use std::sync::Arc;

/// Front for the optional relation capability. A missing capability reads
/// as "nothing linked" and is never an error.
#[derive(Clone, Default)]
pub struct RelationResolver {
    store: Option<Arc<dyn RelationStore>>,
}

impl RelationResolver {
    pub fn new(store: Option<Arc<dyn RelationStore>>) -> Self {
        Self { store }
    }

    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.as_ref().is_some_and(|s| s.is_available())
    }

    /// Object on `target_member_id` linked to `source_object_id` on
    /// `source_member_id`, if any.
    pub async fn resolve(
        &self,
        source_object_id: ObjectId,
        source_member_id: MemberId,
        target_member_id: MemberId,
    ) -> Option<ObjectId> {
        let store = self.store.as_ref().filter(|s| s.is_available())?;

        match store
            .linked_objects(source_member_id, source_object_id)
            .await
        {
            Ok(links) => links.get(&target_member_id).copied(),
            Err(e) => {
                tracing::warn!(
                    "Relation lookup for object {} on member {} failed, treating as unlinked: {}",
                    source_object_id,
                    source_member_id,
                    e
                );
                None
            }
        }
    }

    pub async fn declare(&self, link: RelationLink) -> Result<()> {
        let store = self
            .store
            .as_ref()
            .filter(|s| s.is_available())
            .ok_or_else(|| ReplicationError::relation("relation capability not installed"))?;
        store.set_relation(link).await
    }
}
