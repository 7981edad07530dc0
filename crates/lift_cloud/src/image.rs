//! Machine image migration with bounded polling.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CloudError, CloudResult};

/// Lifecycle state of a machine image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Available,
    Failed,
    Other(String),
}

impl ImageState {
    pub fn parse(state: &str) -> Self {
        match state {
            "pending" => Self::Pending,
            "available" => Self::Available,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ImageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Available => write!(f, "available"),
            Self::Failed => write!(f, "failed"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Image operations against the cloud account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Create an image of an instance in the source region. Returns its id.
    async fn create_image(&self, instance_id: &str, name: &str) -> CloudResult<String>;

    /// Copy an image to the destination region. Returns the copy's id.
    async fn copy_image(
        &self,
        image_id: &str,
        name: &str,
        source_region: &str,
        destination_region: &str,
    ) -> CloudResult<String>;

    async fn image_state(&self, image_id: &str, region: &str) -> CloudResult<ImageState>;
}

/// Polling bounds for image availability.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            interval: Duration::from_secs(30),
        }
    }
}

/// Poll an image until it is available.
///
/// `failed` ends the wait at once; running out of attempts is
/// [`CloudError::ImageTimeout`].
pub async fn wait_for_image<S: ImageService + ?Sized>(
    service: &S,
    image_id: &str,
    region: &str,
    config: &WaitConfig,
) -> CloudResult<()> {
    for attempt in 1..=config.max_attempts {
        match service.image_state(image_id, region).await? {
            ImageState::Available => {
                debug!(image_id = %image_id, attempt, "Image available");
                return Ok(());
            }
            ImageState::Failed => {
                return Err(CloudError::ImageFailed {
                    image_id: image_id.to_string(),
                    state: ImageState::Failed.to_string(),
                });
            }
            state => {
                debug!(
                    image_id = %image_id,
                    attempt,
                    state = %state,
                    "Image not ready, retrying"
                );
                if attempt < config.max_attempts {
                    tokio::time::sleep(config.interval).await;
                }
            }
        }
    }

    Err(CloudError::ImageTimeout {
        image_id: image_id.to_string(),
        attempts: config.max_attempts,
    })
}

/// Why one instance has no destination image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFailure {
    pub instance_id: String,
    pub reason: String,
}

/// Destination image per instance, plus the instances that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub images: BTreeMap<String, String>,
    pub failures: Vec<ImageFailure>,
}

/// Copies instance images into the destination region.
pub struct ImageMigrator<S> {
    service: S,
    source_region: String,
    destination_region: String,
    wait: WaitConfig,
}

impl<S: ImageService> ImageMigrator<S> {
    pub fn new(
        service: S,
        source_region: impl Into<String>,
        destination_region: impl Into<String>,
    ) -> Self {
        Self {
            service,
            source_region: source_region.into(),
            destination_region: destination_region.into(),
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Create, copy and await a destination image for every instance.
    ///
    /// Failures are per instance; the rest of the batch continues.
    pub async fn migrate(&self, instance_ids: &[String]) -> MigrationOutcome {
        let mut outcome = MigrationOutcome::default();
        let mut copies = Vec::new();

        for instance_id in instance_ids {
            match self.copy_instance_image(instance_id).await {
                Ok(copy_id) => copies.push((instance_id, copy_id)),
                Err(e) => Self::fail(&mut outcome, instance_id, e),
            }
        }

        for (instance_id, copy_id) in copies {
            match wait_for_image(&self.service, &copy_id, &self.destination_region, &self.wait).await
            {
                Ok(()) => {
                    info!(instance_id = %instance_id, image_id = %copy_id, "Image ready in destination");
                    outcome.images.insert(instance_id.clone(), copy_id);
                }
                Err(e) => Self::fail(&mut outcome, instance_id, e),
            }
        }

        outcome
    }

    async fn copy_instance_image(&self, instance_id: &str) -> CloudResult<String> {
        let name = format!("lift-{}", instance_id);
        let image_id = self.service.create_image(instance_id, &name).await?;
        debug!(instance_id = %instance_id, image_id = %image_id, "Image created");

        self.service
            .copy_image(&image_id, &name, &self.source_region, &self.destination_region)
            .await
    }

    fn fail(outcome: &mut MigrationOutcome, instance_id: &str, error: CloudError) {
        warn!(instance_id = %instance_id, "Image migration failed: {}", error);
        outcome.failures.push(ImageFailure {
            instance_id: instance_id.to_string(),
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    fn no_wait(max_attempts: u32) -> WaitConfig {
        WaitConfig {
            max_attempts,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_wait_until_available() {
        let mut service = MockImageService::new();
        let mut seq = Sequence::new();
        service
            .expect_image_state()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(ImageState::Pending));
        service
            .expect_image_state()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(ImageState::Available));

        wait_for_image(&service, "ami-1", "eu-west-1", &no_wait(5))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_is_bounded() {
        let mut service = MockImageService::new();
        service
            .expect_image_state()
            .times(3)
            .returning(|_, _| Ok(ImageState::Pending));

        let err = wait_for_image(&service, "ami-1", "eu-west-1", &no_wait(3))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::ImageTimeout { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_failed_image_stops_polling() {
        let mut service = MockImageService::new();
        service
            .expect_image_state()
            .times(1)
            .returning(|_, _| Ok(ImageState::Failed));

        let err = wait_for_image(&service, "ami-1", "eu-west-1", &no_wait(10))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::ImageFailed { .. }));
    }

    #[tokio::test]
    async fn test_migrate_isolates_failures() {
        let mut service = MockImageService::new();
        service
            .expect_create_image()
            .with(eq("i-1"), eq("lift-i-1"))
            .returning(|_, _| Ok("ami-src-1".to_string()));
        service
            .expect_create_image()
            .with(eq("i-2"), eq("lift-i-2"))
            .returning(|_, _| Err(CloudError::Provider("quota exceeded".to_string())));
        service
            .expect_copy_image()
            .with(eq("ami-src-1"), eq("lift-i-1"), eq("us-east-1"), eq("eu-west-1"))
            .returning(|_, _, _, _| Ok("ami-dst-1".to_string()));
        service
            .expect_image_state()
            .with(eq("ami-dst-1"), eq("eu-west-1"))
            .returning(|_, _| Ok(ImageState::Available));

        let migrator = ImageMigrator::new(service, "us-east-1", "eu-west-1").with_wait(no_wait(2));
        let outcome = migrator
            .migrate(&["i-1".to_string(), "i-2".to_string()])
            .await;

        assert_eq!(outcome.images.get("i-1").map(String::as_str), Some("ami-dst-1"));
        assert!(!outcome.images.contains_key("i-2"));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].instance_id, "i-2");
        assert!(outcome.failures[0].reason.contains("quota exceeded"));
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(ImageState::parse("available"), ImageState::Available);
        assert_eq!(ImageState::parse("deregistered").to_string(), "deregistered");
    }
}
