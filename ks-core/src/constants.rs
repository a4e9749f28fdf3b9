// Well-known annotations
pub const TRIGGER_ANNOTATION_KEY: &str = "image.openshift.io/triggers";

// Kinds
pub use ks_api::v1::{
    DOCKER_IMAGE_KIND,
    IMAGE_STREAM_IMAGE_KIND,
    IMAGE_STREAM_TAG_KIND,
    SERVICE_KIND,
};

// Route backend weights; the router accepts weights in [0, MAX_BACKEND_WEIGHT]
pub const DEFAULT_BACKEND_WEIGHT: i32 = 100;
pub const EQUAL_BACKEND_WEIGHT: i32 = 100;
pub const MAX_BACKEND_WEIGHT: i32 = 256;

// After a percentage adjustment, if any weight has grown past RESCALE_THRESHOLD_WEIGHT, every
// nonzero weight is scaled down so the largest becomes RESCALE_TARGET_WEIGHT.  These numbers are
// policy, not anything the router requires.
pub const RESCALE_THRESHOLD_WEIGHT: i32 = 256;
pub const RESCALE_TARGET_WEIGHT: i32 = 200;

// Webhook secrets
pub const WEBHOOK_SECRET_LENGTH: usize = 20;
