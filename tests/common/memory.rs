#![allow(dead_code)]

use async_trait::async_trait;
use network_replicator::core::{
    MetadataGenerator, NetworkDirectory, RecordStore, RelationStore, TargetStorage,
};
use network_replicator::domain::model::{
    MemberId, NewObjectRecord, ObjectId, ObjectMetadata, StoredFile,
};
use network_replicator::{
    NetworkMember, RelationLink, ReplicationEngine, ReplicationError, Result, SourceObject,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

/// A record created on a member.
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub member: MemberId,
    pub id: ObjectId,
    pub record: NewObjectRecord,
}

#[derive(Default)]
struct State {
    next_id: HashMap<MemberId, ObjectId>,
    files: Vec<(MemberId, String, Vec<u8>)>,
    records: Vec<CreatedRecord>,
    metadata: Vec<(MemberId, ObjectId)>,
    /// Results of upload events raised from inside `create_record`.
    nested_events: Vec<Option<usize>>,
}

#[derive(Default)]
pub struct MemoryNetwork {
    members: Vec<MemberId>,
    fail_enumeration: bool,
    failing_writes: HashSet<MemberId>,
    failing_records: HashSet<MemberId>,
    failing_metadata: HashSet<MemberId>,
    state: Mutex<State>,
    upload_hook: OnceLock<Weak<ReplicationEngine>>,
}

impl MemoryNetwork {
    pub fn new(members: &[MemberId]) -> Self {
        Self {
            members: members.to_vec(),
            ..Default::default()
        }
    }

    pub fn offline(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    pub fn failing_write(mut self, member: MemberId) -> Self {
        self.failing_writes.insert(member);
        self
    }

    pub fn failing_record(mut self, member: MemberId) -> Self {
        self.failing_records.insert(member);
        self
    }

    pub fn failing_metadata(mut self, member: MemberId) -> Self {
        self.failing_metadata.insert(member);
        self
    }

    /// Raise an upload event on `engine` every time a record is created,
    /// the way a host observing its own storage would.
    pub fn raise_upload_events_on(&self, engine: &Arc<ReplicationEngine>) {
        let _ = self.upload_hook.set(Arc::downgrade(engine));
    }

    pub fn records(&self) -> Vec<CreatedRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn records_on(&self, member: MemberId) -> Vec<CreatedRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.member == member)
            .collect()
    }

    pub fn files_on(&self, member: MemberId) -> Vec<(String, Vec<u8>)> {
        self.state
            .lock()
            .unwrap()
            .files
            .iter()
            .filter(|(m, _, _)| *m == member)
            .map(|(_, name, bytes)| (name.clone(), bytes.clone()))
            .collect()
    }

    pub fn metadata_attached(&self) -> Vec<(MemberId, ObjectId)> {
        self.state.lock().unwrap().metadata.clone()
    }

    pub fn nested_events(&self) -> Vec<Option<usize>> {
        self.state.lock().unwrap().nested_events.clone()
    }
}

#[async_trait]
impl NetworkDirectory for MemoryNetwork {
    async fn members(&self) -> Result<Vec<NetworkMember>> {
        if self.fail_enumeration {
            return Err(ReplicationError::Enumeration {
                message: "network membership unavailable".to_string(),
            });
        }
        Ok(self.members.iter().copied().map(NetworkMember::new).collect())
    }
}

#[async_trait]
impl TargetStorage for MemoryNetwork {
    async fn write_file(
        &self,
        member: MemberId,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredFile> {
        if self.failing_writes.contains(&member) {
            return Err(ReplicationError::storage(member, "upload directory not writable"));
        }
        self.state
            .lock()
            .unwrap()
            .files
            .push((member, file_name.to_string(), data.to_vec()));
        Ok(StoredFile {
            member_id: member,
            file_name: file_name.to_string(),
            location: format!("memory://{}/{}", member, file_name),
        })
    }
}

#[async_trait]
impl RecordStore for MemoryNetwork {
    async fn create_record(&self, member: MemberId, record: NewObjectRecord) -> Result<ObjectId> {
        if self.failing_records.contains(&member) {
            return Err(ReplicationError::record(member, "insert rejected"));
        }

        let (id, nested) = {
            let mut state = self.state.lock().unwrap();
            let next = state.next_id.entry(member).or_insert(member * 1000);
            *next += 1;
            let id = *next;
            state.records.push(CreatedRecord {
                member,
                id,
                record: record.clone(),
            });
            let nested = SourceObject {
                id,
                owner_member_id: member,
                parent_object_id: record.parent_object_id,
                file_bytes: Vec::new(),
                file_name: record.file_name.clone(),
                mime_type: record.mime_type.clone(),
            };
            (id, nested)
        };

        if let Some(engine) = self.upload_hook.get().and_then(Weak::upgrade) {
            let result = engine.on_object_created(&nested).await?;
            self.state
                .lock()
                .unwrap()
                .nested_events
                .push(result.map(|outcomes| outcomes.len()));
        }

        Ok(id)
    }

    async fn attach_metadata(
        &self,
        member: MemberId,
        object: ObjectId,
        _metadata: ObjectMetadata,
    ) -> Result<()> {
        self.state.lock().unwrap().metadata.push((member, object));
        Ok(())
    }
}

#[async_trait]
impl MetadataGenerator for MemoryNetwork {
    async fn generate(
        &self,
        object: ObjectId,
        stored: &StoredFile,
        mime_type: &str,
    ) -> Result<ObjectMetadata> {
        if self.failing_metadata.contains(&stored.member_id) {
            return Err(ReplicationError::Metadata {
                object_id: object,
                message: "image decoder unavailable".to_string(),
            });
        }
        Ok(ObjectMetadata {
            size_bytes: 0,
            mime_type: mime_type.to_string(),
            derived: Vec::new(),
            generated_at: chrono::Utc::now(),
        })
    }
}

#[derive(Default)]
pub struct MemoryRelations {
    unavailable: bool,
    reject_declarations: bool,
    links: Mutex<Vec<RelationLink>>,
    lookups: AtomicUsize,
}

impl MemoryRelations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn rejecting_declarations(mut self) -> Self {
        self.reject_declarations = true;
        self
    }

    pub fn with_link(self, link: RelationLink) -> Self {
        self.links.lock().unwrap().push(link);
        self
    }

    pub fn links(&self) -> Vec<RelationLink> {
        self.links.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationStore for MemoryRelations {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn linked_objects(
        &self,
        member: MemberId,
        object: ObjectId,
    ) -> Result<HashMap<MemberId, ObjectId>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.source_member_id == member && l.source_object_id == object)
            .map(|l| (l.target_member_id, l.target_object_id))
            .collect())
    }

    async fn set_relation(&self, link: RelationLink) -> Result<()> {
        if self.reject_declarations {
            return Err(ReplicationError::relation("relation table is read-only"));
        }
        self.links.lock().unwrap().push(link);
        Ok(())
    }
}

pub fn engine_for(
    network: &Arc<MemoryNetwork>,
    relations: Option<Arc<MemoryRelations>>,
) -> Arc<ReplicationEngine> {
    let mut engine = ReplicationEngine::new(
        network.clone(),
        network.clone(),
        network.clone(),
        network.clone(),
    );
    if let Some(relations) = relations {
        engine = engine.with_relation_store(relations);
    }
    Arc::new(engine)
}

pub fn upload_on(member: MemberId, id: ObjectId, parent: Option<ObjectId>) -> SourceObject {
    SourceObject {
        id,
        owner_member_id: member,
        parent_object_id: parent,
        file_bytes: b"GIF89a....".to_vec(),
        file_name: "banner.gif".to_string(),
        mime_type: "image/gif".to_string(),
    }
}
