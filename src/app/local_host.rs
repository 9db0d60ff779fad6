use crate::adapters::{FileMetadataGenerator, LocalNetwork, LocalRelationStore};
use crate::config::NetworkConfig;
use crate::core::engine::ReplicationEngine;
use crate::domain::model::{
    MemberId, NetworkMember, ObjectId, ReplicationOutcome, SourceObject,
};
use crate::utils::error::{ReplicationError, Result};
use std::sync::Arc;

/// A filesystem network wired to a replication engine, behaving like a host
/// whose upload event fires the engine.
pub struct LocalHost {
    network: Arc<LocalNetwork>,
    relations: Option<Arc<LocalRelationStore>>,
    engine: ReplicationEngine,
}

pub struct UploadResult {
    pub source: SourceObject,
    /// `None` when the upload event was suppressed as re-entrant.
    pub outcomes: Option<Vec<ReplicationOutcome>>,
}

impl LocalHost {
    pub fn from_config(config: &NetworkConfig) -> Self {
        let network = Arc::new(LocalNetwork::from_config(config));
        let metadata = Arc::new(FileMetadataGenerator::new(config.image_sizes()));

        let mut engine = ReplicationEngine::new(
            network.clone(),
            network.clone(),
            network.clone(),
            metadata,
        );

        let relations = if config.relations_enabled() {
            let store = Arc::new(LocalRelationStore::new(config.links_file()));
            engine = engine.with_relation_store(store.clone());
            Some(store)
        } else {
            None
        };

        Self {
            network,
            relations,
            engine,
        }
    }

    pub fn network(&self) -> &LocalNetwork {
        &self.network
    }

    pub fn relations(&self) -> Option<&LocalRelationStore> {
        self.relations.as_deref()
    }

    pub fn engine(&self) -> &ReplicationEngine {
        &self.engine
    }

    /// Resolves a member given either its numeric id or configured name.
    pub fn resolve_member(config: &NetworkConfig, member: &str) -> Result<MemberId> {
        let id = match member.parse::<MemberId>() {
            Ok(id) => Some(id),
            Err(_) => config.member_by_name(member).map(|m| m.id),
        };
        id.filter(|id| config.member_ids().contains(id))
            .ok_or_else(|| ReplicationError::Validation {
                message: format!("unknown member '{}'", member),
            })
    }

    pub async fn targets_for(&self, member: MemberId) -> Result<Vec<NetworkMember>> {
        crate::core::TargetEnumerator::new(self.network.clone())
            .enumerate(member)
            .await
    }

    /// Stores the upload on `member`, then raises the upload event.
    pub async fn upload(
        &self,
        member: MemberId,
        file_name: &str,
        bytes: Vec<u8>,
        parent: Option<ObjectId>,
        mime_type: Option<&str>,
    ) -> Result<UploadResult> {
        let source = self
            .network
            .upload(member, file_name, bytes, parent, mime_type)
            .await?;
        tracing::info!(
            "Uploaded '{}' as object {} on member {}",
            source.file_name,
            source.id,
            member
        );

        let outcomes = self.engine.on_object_created(&source).await?;
        Ok(UploadResult { source, outcomes })
    }
}
