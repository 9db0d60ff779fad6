mod common;

use common::{engine_for, upload_on, MemoryNetwork, MemoryRelations};
use network_replicator::domain::model::ObjectStatus;
use network_replicator::{OutcomeErrorKind, RelationLink, ReplicationError, WarningKind};
use std::sync::Arc;

const A: u64 = 1;
const B: u64 = 2;
const C: u64 = 3;

#[tokio::test]
async fn test_copies_to_every_other_member_without_relations() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]));
    let engine = engine_for(&network, None);

    let outcomes = engine.replicate(&upload_on(A, 10, None)).await.unwrap();

    let targets: Vec<u64> = outcomes.iter().map(|o| o.target_member_id).collect();
    assert_eq!(targets, vec![B, C]);
    assert!(outcomes.iter().all(|o| o.success));
    assert!(outcomes.iter().all(|o| o.created_object_id.is_some()));
    assert!(outcomes.iter().all(|o| o.warnings.is_empty()));

    assert!(network.records_on(A).is_empty());
    for member in [B, C] {
        let files = network.files_on(member);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "banner.gif");
        assert_eq!(files[0].1, b"GIF89a....".to_vec());

        let records = network.records_on(member);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.title, "banner");
        assert_eq!(records[0].record.mime_type, "image/gif");
        assert_eq!(records[0].record.status, ObjectStatus::Inherited);
        assert_eq!(records[0].record.parent_object_id, None);
    }
    assert_eq!(network.metadata_attached().len(), 2);
}

#[tokio::test]
async fn test_parent_relation_resolved_only_for_linked_member() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]));
    let relations = Arc::new(MemoryRelations::new().with_link(RelationLink {
        source_member_id: A,
        target_member_id: B,
        source_object_id: 5,
        target_object_id: 55,
    }));
    let engine = engine_for(&network, Some(relations.clone()));

    let outcomes = engine.replicate(&upload_on(A, 10, Some(5))).await.unwrap();

    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(network.records_on(B)[0].record.parent_object_id, Some(55));
    assert_eq!(network.records_on(C)[0].record.parent_object_id, None);

    let declared: Vec<RelationLink> = relations
        .links()
        .into_iter()
        .filter(|l| l.source_object_id == 10)
        .collect();
    assert_eq!(declared.len(), 2);
    for (link, outcome) in declared.iter().zip(&outcomes) {
        assert_eq!(link.source_member_id, A);
        assert_eq!(link.target_member_id, outcome.target_member_id);
        assert_eq!(Some(link.target_object_id), outcome.created_object_id);
    }
}

#[tokio::test]
async fn test_storage_failure_is_isolated_to_its_target() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]).failing_write(C));
    let relations = Arc::new(MemoryRelations::new());
    let engine = engine_for(&network, Some(relations.clone()));

    let outcomes = engine.replicate(&upload_on(A, 10, None)).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].success);
    assert_eq!(outcomes[0].target_member_id, B);

    assert_eq!(outcomes[1].target_member_id, C);
    assert!(!outcomes[1].success);
    assert_eq!(
        outcomes[1].error_kind(),
        Some(OutcomeErrorKind::StorageWriteFailed)
    );
    assert!(outcomes[1].created_object_id.is_none());

    assert!(network.records_on(C).is_empty());
    assert!(relations.links().iter().all(|l| l.target_member_id != C));
}

#[tokio::test]
async fn test_failure_on_first_target_does_not_block_later_ones() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]).failing_write(B));
    let engine = engine_for(&network, None);

    let outcomes = engine.replicate(&upload_on(A, 10, None)).await.unwrap();

    assert!(!outcomes[0].success);
    assert!(outcomes[1].success);
    assert_eq!(network.records_on(C).len(), 1);
}

#[tokio::test]
async fn test_no_parent_means_no_relation_lookup() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]));
    let relations = Arc::new(MemoryRelations::new());
    let engine = engine_for(&network, Some(relations.clone()));

    engine.replicate(&upload_on(A, 10, None)).await.unwrap();
    assert_eq!(relations.lookups(), 0);

    engine.replicate(&upload_on(A, 11, Some(3))).await.unwrap();
    assert_eq!(relations.lookups(), 2);
}

#[tokio::test]
async fn test_unavailable_relation_capability_is_transparent() {
    let network = Arc::new(MemoryNetwork::new(&[A, B]));
    let relations = Arc::new(
        MemoryRelations::new()
            .unavailable()
            .with_link(RelationLink {
                source_member_id: A,
                target_member_id: B,
                source_object_id: 5,
                target_object_id: 55,
            }),
    );
    let engine = engine_for(&network, Some(relations.clone()));

    let outcomes = engine.replicate(&upload_on(A, 10, Some(5))).await.unwrap();

    assert!(outcomes[0].success);
    assert!(outcomes[0].warnings.is_empty());
    assert_eq!(network.records_on(B)[0].record.parent_object_id, None);
    assert_eq!(relations.links().len(), 1);
}

#[tokio::test]
async fn test_record_creation_failure() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]).failing_record(B));
    let relations = Arc::new(MemoryRelations::new());
    let engine = engine_for(&network, Some(relations.clone()));

    let outcomes = engine.replicate(&upload_on(A, 10, None)).await.unwrap();

    assert_eq!(
        outcomes[0].error_kind(),
        Some(OutcomeErrorKind::RecordCreationFailed)
    );
    assert!(network.metadata_attached().iter().all(|(m, _)| *m != B));
    assert!(relations.links().iter().all(|l| l.target_member_id != B));
    assert!(outcomes[1].success);
}

#[tokio::test]
async fn test_non_fatal_warnings_keep_success() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]).failing_metadata(B));
    let relations = Arc::new(MemoryRelations::new().rejecting_declarations());
    let engine = engine_for(&network, Some(relations));

    let outcomes = engine.replicate(&upload_on(A, 10, None)).await.unwrap();

    assert!(outcomes.iter().all(|o| o.success));
    assert!(outcomes[0].has_warning(WarningKind::MetadataGenerationFailed));
    assert!(outcomes[0].has_warning(WarningKind::RelationLinkFailed));
    assert!(!outcomes[1].has_warning(WarningKind::MetadataGenerationFailed));
    assert!(outcomes[1].has_warning(WarningKind::RelationLinkFailed));
    assert!(outcomes.iter().all(|o| o.degraded()));
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]).offline());
    let engine = engine_for(&network, None);

    let err = engine.replicate(&upload_on(A, 10, None)).await.unwrap_err();

    assert!(matches!(err, ReplicationError::Enumeration { .. }));
    assert!(err.is_fatal());
    assert!(network.records().is_empty());
    assert!(!engine.is_replicating());
}

#[tokio::test]
async fn test_target_record_creation_does_not_trigger_nested_replication() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]));
    let engine = engine_for(&network, None);
    network.raise_upload_events_on(&engine);

    let outcomes = engine
        .on_object_created(&upload_on(A, 10, None))
        .await
        .unwrap()
        .expect("top-level upload event replicates");

    assert_eq!(outcomes.len(), 2);
    assert_eq!(network.nested_events(), vec![None, None]);
    assert_eq!(network.records().len(), 2);
    assert!(!engine.is_replicating());
}

#[tokio::test]
async fn test_replication_is_not_idempotent() {
    let network = Arc::new(MemoryNetwork::new(&[A, B, C]));
    let engine = engine_for(&network, None);
    let source = upload_on(A, 10, None);

    let first = engine.replicate(&source).await.unwrap();
    let second = engine.replicate(&source).await.unwrap();

    assert_eq!(network.records_on(B).len(), 2);
    assert_eq!(network.records_on(C).len(), 2);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.target_member_id, b.target_member_id);
        assert_ne!(a.created_object_id, b.created_object_id);
    }
}
