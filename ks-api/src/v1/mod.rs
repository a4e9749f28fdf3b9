mod builds;
mod deployment_configs;
mod image_triggers;
mod routes;

pub use builds::*;
pub use deployment_configs::*;
pub use image_triggers::*;
pub use routes::*;

pub const IMAGE_STREAM_TAG_KIND: &str = "ImageStreamTag";
pub const IMAGE_STREAM_IMAGE_KIND: &str = "ImageStreamImage";
pub const DOCKER_IMAGE_KIND: &str = "DockerImage";
pub const SERVICE_KIND: &str = "Service";
