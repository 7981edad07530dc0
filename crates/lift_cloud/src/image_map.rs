//! Offline image service backed by a prepared instance → image map.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::error::{CloudError, CloudResult};
use crate::image::{ImageService, ImageState};

/// Images that already exist in the destination region, keyed by the
/// instance they were made from.
///
/// Read from YAML:
///
/// ```yaml
/// i-0abc: ami-0123
/// i-0def: ami-0456
/// ```
///
/// Creating an image looks the instance up, copying is a no-op and every
/// mapped image is available.
#[derive(Debug, Clone, Default)]
pub struct ImageMap {
    images: BTreeMap<String, String>,
}

impl ImageMap {
    pub fn new(images: BTreeMap<String, String>) -> Self {
        Self { images }
    }

    pub fn load(path: impl AsRef<Path>) -> CloudResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let images: BTreeMap<String, String> =
            serde_yaml::from_str(&content).map_err(|e| CloudError::InvalidImageMap {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        info!("Loaded {} image mappings from {:?}", images.len(), path);
        Ok(Self::new(images))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    fn is_mapped(&self, image_id: &str) -> bool {
        self.images.values().any(|v| v == image_id)
    }
}

#[async_trait]
impl ImageService for ImageMap {
    async fn create_image(&self, instance_id: &str, _name: &str) -> CloudResult<String> {
        self.images
            .get(instance_id)
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .ok_or_else(|| CloudError::not_found("image for instance", instance_id))
    }

    async fn copy_image(
        &self,
        image_id: &str,
        _name: &str,
        _source_region: &str,
        _destination_region: &str,
    ) -> CloudResult<String> {
        Ok(image_id.to_string())
    }

    async fn image_state(&self, image_id: &str, _region: &str) -> CloudResult<ImageState> {
        if self.is_mapped(image_id) {
            Ok(ImageState::Available)
        } else {
            Err(CloudError::not_found("image", image_id))
        }
    }
}
