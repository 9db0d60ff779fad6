use crate::core::NetworkDirectory;
use crate::domain::model::{MemberId, NetworkMember};
use crate::utils::error::{ReplicationError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Lists the members a source object should be copied to.
#[derive(Clone)]
pub struct TargetEnumerator {
    directory: Arc<dyn NetworkDirectory>,
}

impl TargetEnumerator {
    pub fn new(directory: Arc<dyn NetworkDirectory>) -> Self {
        Self { directory }
    }

    /// Every member except `source_member_id`, in directory order.
    pub async fn enumerate(&self, source_member_id: MemberId) -> Result<Vec<NetworkMember>> {
        let members = self
            .directory
            .members()
            .await
            .map_err(|e| {
                if matches!(e, ReplicationError::Enumeration { .. }) {
                    e
                } else {
                    ReplicationError::Enumeration {
                        message: e.to_string(),
                    }
                }
            })?;

        let mut seen = HashSet::new();
        let targets: Vec<NetworkMember> = members
            .into_iter()
            .filter(|m| m.id != source_member_id)
            .filter(|m| seen.insert(m.id))
            .collect();

        tracing::debug!(
            "Enumerated {} target(s) for source member {}",
            targets.len(),
            source_member_id
        );
        Ok(targets)
    }
}
