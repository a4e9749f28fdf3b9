use k8s_openapi::api::core::v1 as corev1;
use ks_api::v1::*;
use rstest::*;

use crate::constants::*;
use crate::objs::*;

pub fn test_image_sources(names: &[&str]) -> Vec<ImageSource> {
    names
        .iter()
        .map(|name| ImageSource {
            from: test_image_stream_tag(name, None),
            ..Default::default()
        })
        .collect()
}

#[fixture]
pub fn test_build_common_spec() -> CommonSpec {
    CommonSpec {
        source: BuildSource {
            type_: Some("Git".into()),
            git: Some(GitBuildSource {
                uri: "https://git.example.com/team/web.git".into(),
                ..Default::default()
            }),
            ..Default::default()
        },
        strategy: BuildStrategy {
            type_: Some("Source".into()),
            source_strategy: Some(SourceBuildStrategy {
                from: test_image_stream_tag(TEST_BUILDER_IMAGE_STREAM_TAG, Some(TEST_NAMESPACE)),
                ..Default::default()
            }),
            ..Default::default()
        },
        output: BuildOutput {
            to: Some(test_image_stream_tag(TEST_IMAGE_STREAM_TAG, None)),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[fixture]
pub fn test_build(#[default(TEST_BUILD)] name: &str) -> Build {
    Build {
        metadata: test_meta(name),
        spec: BuildSpec {
            common: test_build_common_spec(),
            triggered_by: None,
        },
        status: None,
    }
}

pub fn test_webhook_trigger(type_: BuildTriggerType) -> BuildTriggerPolicy {
    let hook = Some(WebHookTrigger {
        secret: Some(TEST_WEBHOOK_SECRET.into()),
        ..Default::default()
    });
    let mut trigger = BuildTriggerPolicy::new(type_.clone());
    match type_ {
        BuildTriggerType::GitHub => trigger.github = hook,
        BuildTriggerType::Generic => trigger.generic = hook,
        BuildTriggerType::GitLab => trigger.gitlab = hook,
        BuildTriggerType::Bitbucket => trigger.bitbucket = hook,
        _ => (),
    }
    trigger
}

pub fn test_image_change_trigger(from: Option<corev1::ObjectReference>) -> BuildTriggerPolicy {
    let mut trigger = BuildTriggerPolicy::new(BuildTriggerType::ImageChange);
    trigger.image_change = Some(ImageChangeTrigger {
        last_triggered_image_id: Some(TEST_LAST_TRIGGERED_IMAGE.into()),
        from,
        ..Default::default()
    });
    trigger
}

// The triggers here are the ones `oc new-app` sets up for a source build: a webhook, an image
// trigger on the builder image (no `from`), and a config change trigger.
#[fixture]
pub fn test_build_config(#[default(TEST_BUILD_CONFIG)] name: &str) -> BuildConfig {
    BuildConfig {
        metadata: test_meta(name),
        spec: BuildConfigSpec {
            common: test_build_common_spec(),
            triggers: vec![
                test_webhook_trigger(BuildTriggerType::GitHub),
                test_image_change_trigger(None),
                BuildTriggerPolicy::new(BuildTriggerType::ConfigChange),
            ],
            run_policy: Some("Serial".into()),
            ..Default::default()
        },
        status: None,
    }
}
