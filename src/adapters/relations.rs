use crate::core::RelationStore;
use crate::domain::model::{MemberId, ObjectId, RelationLink};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Relation links kept as a JSON array in a single file.
///
/// Links form undirected groups: every object reachable from the queried one
/// through any chain of links, in either direction, belongs to its group.
pub struct LocalRelationStore {
    path: PathBuf,
    enabled: bool,
    lock: Mutex<()>,
}

impl LocalRelationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
            lock: Mutex::new(()),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    async fn load(&self) -> Result<Vec<RelationLink>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn links(&self) -> Result<Vec<RelationLink>> {
        let _lock = self.lock.lock().await;
        self.load().await
    }
}

#[async_trait]
impl RelationStore for LocalRelationStore {
    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn linked_objects(
        &self,
        member: MemberId,
        object: ObjectId,
    ) -> Result<HashMap<MemberId, ObjectId>> {
        let links = self.links().await?;
        Ok(relation_group(&links, (member, object)))
    }

    async fn set_relation(&self, link: RelationLink) -> Result<()> {
        let _lock = self.lock.lock().await;
        let mut links = self.load().await?;
        if links.contains(&link) {
            return Ok(());
        }
        links.push(link);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&links)?).await?;
        tracing::debug!(
            "Linked {}:{} with {}:{}",
            link.source_member_id,
            link.source_object_id,
            link.target_member_id,
            link.target_object_id
        );
        Ok(())
    }
}

/// Breadth-first walk over `links` from `anchor`. The first object found
/// for a member wins; the anchor itself is not part of the result.
fn relation_group(
    links: &[RelationLink],
    anchor: (MemberId, ObjectId),
) -> HashMap<MemberId, ObjectId> {
    let mut neighbours: HashMap<(MemberId, ObjectId), Vec<(MemberId, ObjectId)>> = HashMap::new();
    for link in links {
        let source = (link.source_member_id, link.source_object_id);
        let target = (link.target_member_id, link.target_object_id);
        neighbours.entry(source).or_default().push(target);
        neighbours.entry(target).or_default().push(source);
    }

    let mut seen = HashSet::from([anchor]);
    let mut queue = VecDeque::from([anchor]);
    let mut group = HashMap::new();
    while let Some(node) = queue.pop_front() {
        for &next in neighbours.get(&node).into_iter().flatten() {
            if !seen.insert(next) {
                continue;
            }
            if next.0 != anchor.0 {
                group.entry(next.0).or_insert(next.1);
            }
            queue.push_back(next);
        }
    }
    group
}
