// Adapters layer: filesystem implementations of the domain ports, used by the CLI
// and as a reference host.

pub mod local;
pub mod metadata;
pub mod relations;

pub use local::{LocalNetwork, StoredObject};
pub use metadata::FileMetadataGenerator;
pub use relations::LocalRelationStore;
