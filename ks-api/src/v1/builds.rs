use std::collections::BTreeMap;

use k8s_openapi::api::core::v1 as corev1;
use kube::CustomResource;
use serde::{
    Deserialize,
    Serialize,
};

// The build types only model the fields that kset reads or writes.  Everything else is collected
// into the `extra` maps when the object is parsed, and written back out as-is.

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBuildSource {
    pub uri: String,

    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSourcePath {
    pub source_path: String,
    pub destination_dir: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub from: corev1::ObjectReference,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<ImageSourcePath>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<corev1::LocalObjectReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSource {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitBuildSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageSource>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_dir: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerBuildStrategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<corev1::ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<corev1::LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_cache: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<corev1::EnvVar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dockerfile_path: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceBuildStrategy {
    pub from: corev1::ObjectReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<corev1::LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<corev1::EnvVar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomBuildStrategy {
    pub from: corev1::ObjectReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_secret: Option<corev1::LocalObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<corev1::EnvVar>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expose_docker_socket: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsPipelineBuildStrategy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jenkinsfile_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jenkinsfile: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStrategy {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_strategy: Option<DockerBuildStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_strategy: Option<SourceBuildStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_strategy: Option<CustomBuildStrategy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jenkins_pipeline_strategy: Option<JenkinsPipelineBuildStrategy>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BuildStrategy {
    // The image the build strategy runs on top of, if the strategy has one
    pub fn input_reference(&self) -> Option<&corev1::ObjectReference> {
        if let Some(s) = &self.source_strategy {
            Some(&s.from)
        } else if let Some(s) = &self.docker_strategy {
            s.from.as_ref()
        } else if let Some(s) = &self.custom_strategy {
            Some(&s.from)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<corev1::ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_secret: Option<corev1::LocalObjectReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// CommonSpec is shared between builds and build configs; it's flattened into both specs
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,

    #[serde(default, skip_serializing_if = "is_default")]
    pub source: BuildSource,

    #[serde(default)]
    pub strategy: BuildStrategy,

    #[serde(default, skip_serializing_if = "is_default")]
    pub output: BuildOutput,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_deadline_seconds: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, CustomResource, Debug, Default, Deserialize, PartialEq, Serialize)]
#[kube(group = "build.openshift.io", version = "v1", kind = "Build", namespaced)]
#[kube(schema = "disabled", status = "BuildStatus", derive = "Default", derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(flatten)]
    pub common: CommonSpec,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<Vec<serde_json::Value>>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_docker_image_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<corev1::ObjectReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BuildTriggerType {
    GitHub,
    Generic,
    GitLab,
    Bitbucket,
    ImageChange,
    ConfigChange,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SecretLocalReference {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebHookTrigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_env: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_reference: Option<SecretLocalReference>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageChangeTrigger {
    #[serde(rename = "lastTriggeredImageID", skip_serializing_if = "Option::is_none")]
    pub last_triggered_image_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<corev1::ObjectReference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTriggerPolicy {
    #[serde(rename = "type")]
    pub type_: BuildTriggerType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<WebHookTrigger>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic: Option<WebHookTrigger>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<WebHookTrigger>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitbucket: Option<WebHookTrigger>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_change: Option<ImageChangeTrigger>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl BuildTriggerPolicy {
    pub fn new(type_: BuildTriggerType) -> BuildTriggerPolicy {
        BuildTriggerPolicy {
            type_,
            github: None,
            generic: None,
            gitlab: None,
            bitbucket: None,
            image_change: None,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Clone, CustomResource, Debug, Default, Deserialize, PartialEq, Serialize)]
#[kube(group = "build.openshift.io", version = "v1", kind = "BuildConfig", namespaced)]
#[kube(schema = "disabled", status = "BuildConfigStatus", derive = "Default", derive = "PartialEq")]
#[kube(shortname = "bc")]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigSpec {
    #[serde(flatten)]
    pub common: CommonSpec,

    #[serde(default)]
    pub triggers: Vec<BuildTriggerPolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_builds_history_limit: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_builds_history_limit: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfigStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_version: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
