use crate::core::guard::ReentrancyGuard;
use crate::core::naming::{resolve_mime_type, title_from_file_name};
use crate::core::{
    MetadataGenerator, NetworkDirectory, RecordStore, RelationResolver, RelationStore,
    TargetEnumerator, TargetStorage,
};
use crate::domain::model::{
    NetworkMember, NewObjectRecord, ObjectId, ObjectStatus, OutcomeErrorKind, RelationLink,
    ReplicationOutcome, ReplicationReport, SourceObject, StoredFile, WarningKind,
};
use crate::utils::error::{ReplicationError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Copies a source object to every other member of the network.
///
/// Targets are processed one after another in enumeration order. A failure
/// on one target is recorded in that target's outcome and never stops the
/// remaining targets; only enumeration failure aborts the call.
pub struct ReplicationEngine {
    enumerator: TargetEnumerator,
    relations: RelationResolver,
    storage: Arc<dyn TargetStorage>,
    records: Arc<dyn RecordStore>,
    metadata: Arc<dyn MetadataGenerator>,
    guard: ReentrancyGuard,
}

impl ReplicationEngine {
    pub fn new(
        directory: Arc<dyn NetworkDirectory>,
        storage: Arc<dyn TargetStorage>,
        records: Arc<dyn RecordStore>,
        metadata: Arc<dyn MetadataGenerator>,
    ) -> Self {
        Self {
            enumerator: TargetEnumerator::new(directory),
            relations: RelationResolver::disabled(),
            storage,
            records,
            metadata,
            guard: ReentrancyGuard::new(),
        }
    }

    pub fn with_relation_store(mut self, store: Arc<dyn RelationStore>) -> Self {
        self.relations = RelationResolver::new(Some(store));
        self
    }

    /// Share a guard identity with a host that dispatches upload events
    /// itself, so its own hooks can check [`ReentrancyGuard::is_active`].
    pub fn with_guard(mut self, guard: ReentrancyGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    /// True when called from inside one of this engine's runs.
    pub fn is_replicating(&self) -> bool {
        self.guard.is_active()
    }

    /// Host upload hook. Returns `None` when the event was raised by this
    /// engine's own record creation and has been suppressed.
    pub async fn on_object_created(
        &self,
        source: &SourceObject,
    ) -> Result<Option<Vec<ReplicationOutcome>>> {
        if self.guard.is_active() {
            tracing::debug!(
                "Suppressed re-entrant upload event for object {} on member {}",
                source.id,
                source.owner_member_id
            );
            return Ok(None);
        }
        match self.replicate(source).await {
            Ok(outcomes) => Ok(Some(outcomes)),
            Err(ReplicationError::AlreadyReplicating) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn replicate(&self, source: &SourceObject) -> Result<Vec<ReplicationOutcome>> {
        self.run(source, None).await
    }

    /// Like [`replicate`](Self::replicate), but once `shutdown` reads `true`
    /// every target not yet started is reported as cancelled.
    pub async fn replicate_with_shutdown(
        &self,
        source: &SourceObject,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<ReplicationOutcome>> {
        self.run(source, Some(shutdown)).await
    }

    async fn run(
        &self,
        source: &SourceObject,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<Vec<ReplicationOutcome>> {
        if self.guard.is_active() {
            return Err(ReplicationError::AlreadyReplicating);
        }
        self.guard.scope(self.run_targets(source, shutdown)).await
    }

    async fn run_targets(
        &self,
        source: &SourceObject,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<Vec<ReplicationOutcome>> {
        tracing::info!(
            "Replicating '{}' (object {}) from member {}",
            source.file_name,
            source.id,
            source.owner_member_id
        );

        let targets = self.enumerator.enumerate(source.owner_member_id).await?;
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            if shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
                outcomes.push(ReplicationOutcome::failed(
                    target.id,
                    OutcomeErrorKind::Cancelled,
                    "replication cancelled before this target started",
                ));
                continue;
            }
            outcomes.push(self.replicate_to(source, target).await);
        }

        let report = ReplicationReport::from_outcomes(&outcomes);
        tracing::info!(
            "Replication of object {} finished: {} succeeded, {} failed, {} degraded",
            source.id,
            report.succeeded,
            report.failed,
            report.degraded
        );
        Ok(outcomes)
    }

    async fn replicate_to(&self, source: &SourceObject, target: NetworkMember) -> ReplicationOutcome {
        let target_parent = match source.parent_object_id {
            Some(parent) => {
                self.relations
                    .resolve(parent, source.owner_member_id, target.id)
                    .await
            }
            None => None,
        };

        let stored = match self
            .storage
            .write_file(target.id, &source.file_name, &source.file_bytes)
            .await
        {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Skipping member {}: storage write failed: {}", target.id, e);
                return ReplicationOutcome::failed(
                    target.id,
                    OutcomeErrorKind::StorageWriteFailed,
                    e.to_string(),
                );
            }
        };
        tracing::debug!(
            "Stored '{}' on member {} at {}",
            stored.file_name,
            target.id,
            stored.location
        );

        let mime_type = resolve_mime_type(&source.file_name, &source.mime_type);
        let record = NewObjectRecord {
            title: title_from_file_name(&source.file_name),
            mime_type: mime_type.clone(),
            parent_object_id: target_parent,
            status: ObjectStatus::Inherited,
            file_name: stored.file_name.clone(),
            location: stored.location.clone(),
        };

        let created = match self.records.create_record(target.id, record).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping member {}: record creation failed: {}", target.id, e);
                return ReplicationOutcome::failed(
                    target.id,
                    OutcomeErrorKind::RecordCreationFailed,
                    e.to_string(),
                );
            }
        };

        let mut outcome = ReplicationOutcome::succeeded(target.id, created);

        if let Err(e) = self.attach_metadata(&stored, created, &mime_type).await {
            tracing::warn!(
                "Metadata for object {} on member {} not generated: {}",
                created,
                target.id,
                e
            );
            outcome.warn(WarningKind::MetadataGenerationFailed, e.to_string());
        }

        if self.relations.is_available() {
            let link = RelationLink {
                source_member_id: source.owner_member_id,
                target_member_id: target.id,
                source_object_id: source.id,
                target_object_id: created,
            };
            if let Err(e) = self.relations.declare(link).await {
                tracing::warn!(
                    "Relation {}:{} -> {}:{} not declared: {}",
                    source.owner_member_id,
                    source.id,
                    target.id,
                    created,
                    e
                );
                outcome.warn(WarningKind::RelationLinkFailed, e.to_string());
            }
        }

        tracing::debug!("Member {} received object {}", target.id, created);
        outcome
    }

    async fn attach_metadata(
        &self,
        stored: &StoredFile,
        object: ObjectId,
        mime_type: &str,
    ) -> Result<()> {
        let metadata = self.metadata.generate(object, stored, mime_type).await?;
        self.records
            .attach_metadata(stored.member_id, object, metadata)
            .await
    }
}
