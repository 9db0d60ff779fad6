use crate::config::toml_config::{default_image_sizes, ImageSizeConfig};
use crate::core::naming::{extension, is_image, title_from_file_name};
use crate::core::MetadataGenerator;
use crate::domain::model::{DerivedRepresentation, ObjectId, ObjectMetadata, StoredFile};
use crate::utils::error::{ReplicationError, Result};
use async_trait::async_trait;
use chrono::Utc;

/// Reads size from disk and names the resized variants an image would get.
/// Variants are described, not rendered.
#[derive(Debug, Clone)]
pub struct FileMetadataGenerator {
    sizes: Vec<ImageSizeConfig>,
}

impl FileMetadataGenerator {
    pub fn new(sizes: Vec<ImageSizeConfig>) -> Self {
        Self { sizes }
    }

    fn derived_for(&self, file_name: &str) -> Vec<DerivedRepresentation> {
        let stem = title_from_file_name(file_name);
        let ext = extension(file_name)
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        self.sizes
            .iter()
            .map(|size| DerivedRepresentation {
                name: size.name.clone(),
                width: size.width,
                height: size.height,
                file_name: format!("{}-{}x{}{}", stem, size.width, size.height, ext),
            })
            .collect()
    }
}

impl Default for FileMetadataGenerator {
    fn default() -> Self {
        Self::new(default_image_sizes())
    }
}

#[async_trait]
impl MetadataGenerator for FileMetadataGenerator {
    async fn generate(
        &self,
        object: ObjectId,
        stored: &StoredFile,
        mime_type: &str,
    ) -> Result<ObjectMetadata> {
        let size_bytes = tokio::fs::metadata(&stored.location)
            .await
            .map_err(|e| ReplicationError::Metadata {
                object_id: object,
                message: format!("cannot stat {}: {}", stored.location, e),
            })?
            .len();

        let derived = if is_image(mime_type) {
            self.derived_for(&stored.file_name)
        } else {
            Vec::new()
        };

        Ok(ObjectMetadata {
            size_bytes,
            mime_type: mime_type.to_string(),
            derived,
            generated_at: Utc::now(),
        })
    }
}
