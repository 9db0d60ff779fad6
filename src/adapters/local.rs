//! Filesystem-backed network.
//!
//! Layout under the network root:
//!
//! ```text
//! <root>/<member_id>/uploads/<file>
//! <root>/<member_id>/objects.json
//! ```

use crate::config::NetworkConfig;
use crate::core::naming::{extension, resolve_mime_type, title_from_file_name};
use crate::core::{NetworkDirectory, RecordStore, TargetStorage};
use crate::domain::model::{
    MemberId, NetworkMember, NewObjectRecord, ObjectId, ObjectMetadata, ObjectStatus,
    SourceObject, StoredFile,
};
use crate::utils::error::{ReplicationError, Result};
use crate::utils::validation::validate_file_name;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const UPLOADS_DIR: &str = "uploads";
const INDEX_FILE: &str = "objects.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ObjectId,
    pub title: String,
    pub mime_type: String,
    pub parent_object_id: Option<ObjectId>,
    pub status: ObjectStatus,
    pub file_name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<ObjectMetadata>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ObjectIndex {
    next_id: ObjectId,
    objects: Vec<StoredObject>,
}

pub struct LocalNetwork {
    root: PathBuf,
    members: Vec<NetworkMember>,
    index_lock: Mutex<()>,
}

impl LocalNetwork {
    pub fn new(root: impl Into<PathBuf>, members: Vec<NetworkMember>) -> Self {
        Self {
            root: root.into(),
            members,
            index_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        let members = config
            .member_ids()
            .into_iter()
            .map(NetworkMember::new)
            .collect();
        Self::new(config.root(), members)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn member_dir(&self, member: MemberId) -> PathBuf {
        self.root.join(member.to_string())
    }

    fn ensure_member(&self, member: MemberId) -> Result<()> {
        if self.members.iter().any(|m| m.id == member) {
            Ok(())
        } else {
            Err(ReplicationError::Validation {
                message: format!("member {} is not part of the network", member),
            })
        }
    }

    async fn load_index(&self, member: MemberId) -> Result<ObjectIndex> {
        let path = self.member_dir(member).join(INDEX_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ObjectIndex::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_index(&self, member: MemberId, index: &ObjectIndex) -> Result<()> {
        let dir = self.member_dir(member);
        tokio::fs::create_dir_all(&dir).await?;
        let json = serde_json::to_vec_pretty(index)?;
        tokio::fs::write(dir.join(INDEX_FILE), json).await?;
        Ok(())
    }

    /// All object records held by `member`, in creation order.
    pub async fn objects(&self, member: MemberId) -> Result<Vec<StoredObject>> {
        self.ensure_member(member)?;
        let _lock = self.index_lock.lock().await;
        Ok(self.load_index(member).await?.objects)
    }

    pub async fn object(&self, member: MemberId, id: ObjectId) -> Result<Option<StoredObject>> {
        Ok(self
            .objects(member)
            .await?
            .into_iter()
            .find(|o| o.id == id))
    }

    /// Stores a user upload on `member` and returns it as a replication source.
    pub async fn upload(
        &self,
        member: MemberId,
        file_name: &str,
        bytes: Vec<u8>,
        parent_object_id: Option<ObjectId>,
        declared_mime: Option<&str>,
    ) -> Result<SourceObject> {
        let stored = self.write_file(member, file_name, &bytes).await?;
        let mime_type = resolve_mime_type(file_name, declared_mime.unwrap_or_default());
        let record = NewObjectRecord {
            title: title_from_file_name(file_name),
            mime_type: mime_type.clone(),
            parent_object_id,
            status: ObjectStatus::Published,
            file_name: stored.file_name.clone(),
            location: stored.location,
        };
        let id = self.create_record(member, record).await?;

        Ok(SourceObject {
            id,
            owner_member_id: member,
            parent_object_id,
            file_bytes: bytes,
            file_name: stored.file_name,
            mime_type,
        })
    }
}

/// `name.ext`, `name-1.ext`, `name-2.ext`, ...
fn candidate_name(file_name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }
    let stem = title_from_file_name(file_name);
    let suffix = extension(file_name)
        .map(|_| &file_name[stem.len()..])
        .unwrap_or("");
    format!("{}-{}{}", stem, attempt, suffix)
}

/// Claims the first free candidate name in `dir` by creating it exclusively,
/// so concurrent writers of the same name never share a file.
async fn create_unique_file(dir: &Path, file_name: &str) -> Result<(String, PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let candidate = candidate_name(file_name, attempt);
        let path = dir.join(&candidate);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((candidate, path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

#[async_trait]
impl NetworkDirectory for LocalNetwork {
    async fn members(&self) -> Result<Vec<NetworkMember>> {
        Ok(self.members.clone())
    }
}

#[async_trait]
impl TargetStorage for LocalNetwork {
    async fn write_file(
        &self,
        member: MemberId,
        file_name: &str,
        data: &[u8],
    ) -> Result<StoredFile> {
        self.ensure_member(member)
            .and_then(|_| validate_file_name("file_name", file_name))
            .map_err(|e| ReplicationError::storage(member, e.to_string()))?;

        let dir = self.member_dir(member).join(UPLOADS_DIR);
        let write = async {
            tokio::fs::create_dir_all(&dir).await?;
            let (final_name, path, mut file) = create_unique_file(&dir, file_name).await?;
            file.write_all(data).await?;
            file.flush().await?;
            Ok::<_, ReplicationError>((final_name, path))
        };
        let (final_name, path) = write
            .await
            .map_err(|e| ReplicationError::storage(member, e.to_string()))?;

        Ok(StoredFile {
            member_id: member,
            file_name: final_name,
            location: path.to_string_lossy().into_owned(),
        })
    }
}

#[async_trait]
impl RecordStore for LocalNetwork {
    async fn create_record(&self, member: MemberId, record: NewObjectRecord) -> Result<ObjectId> {
        self.ensure_member(member)
            .map_err(|e| ReplicationError::record(member, e.to_string()))?;

        let _lock = self.index_lock.lock().await;
        let mut index = self.load_index(member).await?;
        index.next_id += 1;
        let id = index.next_id;
        index.objects.push(StoredObject {
            id,
            title: record.title,
            mime_type: record.mime_type,
            parent_object_id: record.parent_object_id,
            status: record.status,
            file_name: record.file_name,
            location: record.location,
            created_at: Utc::now(),
            metadata: None,
        });
        self.save_index(member, &index).await?;

        tracing::debug!("Created object {} on member {}", id, member);
        Ok(id)
    }

    async fn attach_metadata(
        &self,
        member: MemberId,
        object: ObjectId,
        metadata: ObjectMetadata,
    ) -> Result<()> {
        let _lock = self.index_lock.lock().await;
        let mut index = self.load_index(member).await?;
        let entry = index
            .objects
            .iter_mut()
            .find(|o| o.id == object)
            .ok_or_else(|| ReplicationError::Metadata {
                object_id: object,
                message: format!("object not found on member {}", member),
            })?;
        entry.metadata = Some(metadata);
        self.save_index(member, &index).await
    }
}
