pub mod engine;
pub mod enumerator;
pub mod guard;
pub mod naming;
pub mod relations;

pub use crate::domain::model::{
    NetworkMember, RelationLink, ReplicationOutcome, ReplicationReport, SourceObject,
};
pub use crate::domain::ports::{
    MetadataGenerator, NetworkDirectory, RecordStore, RelationStore, TargetStorage,
};
pub use crate::utils::error::Result;
pub use enumerator::TargetEnumerator;
pub use relations::RelationResolver;
