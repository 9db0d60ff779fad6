use crate::utils::error::{ReplicationError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "network-replicate")]
#[command(about = "Upload a file on one network member and copy it to all others")]
pub struct CliConfig {
    /// Path to the network TOML configuration
    #[arg(short, long, default_value = "network.toml")]
    pub config: String,

    /// Member the file is uploaded on (id or configured name)
    #[arg(short, long)]
    pub member: String,

    /// File to upload
    #[arg(short, long)]
    pub file: String,

    /// Object on the source member the upload is attached to
    #[arg(long)]
    pub parent: Option<u64>,

    /// Mime type to declare for the upload when the extension is unknown
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Print outcomes as JSON
    #[arg(long)]
    pub json: bool,

    /// Only list the members the file would be copied to
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("config", &self.config)?;
        validation::validate_path("file", &self.file)?;
        validation::validate_non_empty_string("member", &self.member)?;
        if let Some(mime) = &self.mime_type {
            if !mime.contains('/') {
                return Err(ReplicationError::InvalidConfigValue {
                    field: "mime_type".to_string(),
                    value: mime.clone(),
                    reason: "Expected type/subtype".to_string(),
                });
            }
        }
        Ok(())
    }
}
