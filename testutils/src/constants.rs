pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_OTHER_NAMESPACE: &str = "other-namespace";

pub const TEST_POD: &str = "the-pod";
pub const TEST_DEPLOYMENT: &str = "the-deployment";
pub const TEST_DAEMONSET: &str = "the-daemonset";
pub const TEST_CRONJOB: &str = "the-cronjob";
pub const TEST_DEPLOYMENT_CONFIG: &str = "the-deployment-config";
pub const TEST_BUILD: &str = "the-build";
pub const TEST_BUILD_CONFIG: &str = "the-build-config";
pub const TEST_ROUTE: &str = "the-route";
pub const TEST_CONFIG_MAP: &str = "the-config-map";

pub const TEST_INIT_CONTAINER: &str = "init";
pub const TEST_CONTAINER: &str = "web";
pub const TEST_SIDECAR_CONTAINER: &str = "sidecar";

pub const TEST_INIT_IMAGE: &str = "busybox:latest";
pub const TEST_IMAGE: &str = "registry.example.com/team/web:v1";
pub const TEST_SIDECAR_IMAGE: &str = "registry.example.com/team/proxy:v3";

pub const TEST_IMAGE_STREAM_TAG: &str = "web:latest";
pub const TEST_BUILDER_IMAGE_STREAM_TAG: &str = "builder:1.2";
pub const TEST_LAST_TRIGGERED_IMAGE: &str = "registry.example.com/team/web@sha256:abcd";
pub const TEST_WEBHOOK_SECRET: &str = "s3cr3t";
