use ks_core::config::{
    KsetConfig,
    OutputFormat,
};

use super::*;
use crate::image_refs::{
    Args,
    cmd,
    parse_mappings,
};

const NEW_INIT_IMAGE: &str = "busybox:1.36";

fn args(file: &assert_fs::NamedTempFile) -> Args {
    Args {
        filename: path(file),
        mappings: vec![format!("{TEST_INIT_IMAGE}={NEW_INIT_IMAGE}")],
        output: Some(OutputFormat::Patch),
        ..Default::default()
    }
}

#[rstest]
fn test_rewrite_images(test_pod: corev1::Pod, test_route: Route) {
    let file = objects_file(vec![
        Object::Pod(test_pod),
        Object::Route(test_route),
        Object::Other(test_config_map(TEST_CONFIG_MAP)),
        Object::CronJob(test_cronjob(TEST_CRONJOB)),
    ]);
    let mut out: Vec<u8> = vec![];
    cmd(&args(&file), &KsetConfig::default(), &mut out).unwrap();

    let lines = patch_lines(&out);
    assert_eq!(lines, vec![
        (
            format!("pod/{TEST_POD}"),
            json::json!([{"op": "replace", "path": "/spec/initContainers/0/image", "value": NEW_INIT_IMAGE}]),
        ),
        (
            format!("cronjob/{TEST_CRONJOB}"),
            json::json!([{
                "op": "replace",
                "path": "/spec/jobTemplate/spec/template/spec/initContainers/0/image",
                "value": NEW_INIT_IMAGE,
            }]),
        ),
    ]);
}

#[rstest]
fn test_rewrite_build_images(test_build_config: BuildConfig) {
    let file = objects_file(vec![Object::BuildConfig(test_build_config)]);
    let args = Args { mappings: vec![format!("{TEST_BUILDER_IMAGE_STREAM_TAG}=builder:2.0")], ..args(&file) };
    let mut out: Vec<u8> = vec![];
    cmd(&args, &KsetConfig::default(), &mut out).unwrap();

    let lines = patch_lines(&out);
    assert_len_eq_x!(&lines, 1);
    assert_eq!(lines[0].1[0]["path"], "/spec/strategy/sourceStrategy/from/name");
    assert_eq!(lines[0].1[0]["value"], "builder:2.0");
}

#[rstest]
fn test_rewrite_skips_unchanged_from_old(test_pod: corev1::Pod) {
    let old = objects_file(vec![Object::Pod(test_pod.clone())]);

    // Only the site that differs from the old version is eligible for rewriting
    let mut changed = test_pod.clone();
    changed.spec.as_mut().unwrap().containers[0].image = Some(TEST_INIT_IMAGE.into());
    let file = objects_file(vec![Object::Pod(changed)]);

    let args = Args { old: Some(path(&old)), ..args(&file) };
    let mut out: Vec<u8> = vec![];
    cmd(&args, &KsetConfig::default(), &mut out).unwrap();

    let lines = patch_lines(&out);
    assert_len_eq_x!(&lines, 1);
    assert_eq!(
        lines[0].1,
        json::json!([{"op": "replace", "path": "/spec/containers/0/image", "value": NEW_INIT_IMAGE}])
    );
}

#[rstest]
fn test_rewrite_nothing_to_do(test_deployment: appsv1::Deployment) {
    let file = objects_file(vec![Object::Deployment(test_deployment)]);
    let args = Args { mappings: vec!["not-there:1=somewhere:2".into()], ..args(&file) };
    let mut out: Vec<u8> = vec![];
    cmd(&args, &KsetConfig::default(), &mut out).unwrap();

    assert_is_empty!(out);
}

#[rstest]
#[case::no_equals(&["busybox"], "invalid mapping \"busybox\": expected FROM=TO")]
#[case::empty_to(&["busybox="], "invalid mapping \"busybox=\": expected FROM=TO")]
#[case::duplicate(&["a=b", "a=c"], "image a is mapped more than once")]
fn test_parse_mappings_invalid(#[case] mappings: &[&str], #[case] expected: &str) {
    let mappings: Vec<_> = mappings.iter().map(|m| m.to_string()).collect();
    let err = parse_mappings(&mappings).unwrap_err();
    assert_eq!(err.to_string(), expected);
}
