//! Copies an uploaded file to every other member of a multi-member network.
//!
//! The [`ReplicationEngine`] asks a [`TargetEnumerator`] for the targets,
//! resolves each target's parent through an optional relation capability,
//! and reports one [`ReplicationOutcome`] per target in enumeration order.
//! Hosts plug in through the traits in [`domain::ports`]; the [`adapters`]
//! module provides filesystem implementations.

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use app::LocalHost;
pub use config::NetworkConfig;
pub use crate::core::{
    engine::ReplicationEngine, guard::ReentrancyGuard, RelationResolver, TargetEnumerator,
};
pub use domain::model::{
    NetworkMember, OutcomeErrorKind, RelationLink, ReplicationOutcome, ReplicationReport,
    SourceObject, WarningKind,
};
pub use utils::error::{ReplicationError, Result};
