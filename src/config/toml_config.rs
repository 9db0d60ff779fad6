use crate::utils::error::{ReplicationError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LINKS_FILE: &str = "relations.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network: NetworkSection,
    pub relations: Option<RelationsConfig>,
    pub metadata: Option<MetadataConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    pub name: Option<String>,
    pub root: String,
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberConfig {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsConfig {
    pub enabled: bool,
    pub links_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub sizes: Option<Vec<ImageSizeConfig>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizeConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl NetworkConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReplicationError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReplicationError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.network.root)
    }

    pub fn member_ids(&self) -> Vec<u64> {
        self.network.members.iter().map(|m| m.id).collect()
    }

    pub fn member_by_name(&self, name: &str) -> Option<&MemberConfig> {
        self.network
            .members
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }

    pub fn relations_enabled(&self) -> bool {
        self.relations.as_ref().map(|r| r.enabled).unwrap_or(false)
    }

    pub fn links_file(&self) -> PathBuf {
        let name = self
            .relations
            .as_ref()
            .and_then(|r| r.links_file.clone())
            .unwrap_or_else(|| DEFAULT_LINKS_FILE.to_string());
        self.root().join(name)
    }

    pub fn image_sizes(&self) -> Vec<ImageSizeConfig> {
        self.metadata
            .as_ref()
            .and_then(|m| m.sizes.clone())
            .unwrap_or_else(default_image_sizes)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("network.root", &self.network.root)?;
        validation::validate_positive_number("network.members", self.network.members.len(), 2)?;
        validation::validate_unique_ids("network.members", &self.member_ids())?;

        if let Some(relations) = &self.relations {
            if let Some(file) = &relations.links_file {
                validation::validate_file_name("relations.links_file", file)?;
            }
        }

        for size in self.image_sizes() {
            validation::validate_non_empty_string("metadata.sizes.name", &size.name)?;
            validation::validate_range("metadata.sizes.width", size.width, 1, 10_000)?;
            validation::validate_range("metadata.sizes.height", size.height, 1, 10_000)?;
        }

        if let Some(level) = self.log_level() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(ReplicationError::InvalidConfigValue {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }
}

pub fn default_image_sizes() -> Vec<ImageSizeConfig> {
    vec![
        ImageSizeConfig {
            name: "thumbnail".to_string(),
            width: 150,
            height: 150,
        },
        ImageSizeConfig {
            name: "medium".to_string(),
            width: 300,
            height: 300,
        },
        ImageSizeConfig {
            name: "large".to_string(),
            width: 1024,
            height: 1024,
        },
    ]
}

impl Validate for NetworkConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
