use insta::assert_snapshot;
use ks_core::config::{
    KsetConfig,
    OutputFormat,
};

use super::*;
use crate::volumes::{
    Args,
    cmd,
};

fn args(file: &assert_fs::NamedTempFile) -> Args {
    Args { filename: path(file), ..Default::default() }
}

fn deployment_with_volumes() -> appsv1::Deployment {
    let mut deployment = test_deployment(TEST_DEPLOYMENT);
    let spec = deployment.spec.as_mut().unwrap().template.spec.as_mut().unwrap();
    spec.volumes = Some(vec![
        corev1::Volume { name: "data".into(), empty_dir: Some(Default::default()), ..Default::default() },
        corev1::Volume {
            name: "creds".into(),
            secret: Some(corev1::SecretVolumeSource { secret_name: Some("creds".into()), ..Default::default() }),
            ..Default::default()
        },
    ]);
    spec.containers[0].volume_mounts =
        Some(vec![corev1::VolumeMount { name: "data".into(), mount_path: "/data".into(), ..Default::default() }]);
    deployment
}

fn template_spec(obj: &Object) -> &corev1::PodSpec {
    let Object::Deployment(deployment) = obj else { panic!("expected a deployment") };
    deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap()
}

#[rstest]
fn test_print_volumes(test_route: Route) {
    let file = objects_file(vec![
        Object::Deployment(deployment_with_volumes()),
        Object::Route(test_route),
        Object::Pod(test_pod(TEST_POD)),
    ]);
    let mut out: Vec<u8> = vec![];
    cmd(&args(&file), &KsetConfig::default(), &mut out).unwrap();

    assert_snapshot!(String::from_utf8(out).unwrap(), @r"
    deployment/the-deployment
      empty directory as data
        mounted at /data in container web
      secret/creds as creds
    pod/the-pod
    ");
}

#[rstest]
fn test_print_missing_volume() {
    let file = objects_file(vec![Object::Deployment(deployment_with_volumes())]);
    let args = Args { name: Some("nope".into()), ..args(&file) };
    let err = cmd(&args, &KsetConfig::default(), &mut Vec::<u8>::new()).unwrap_err();

    assert_eq!(format!("{err:#}"), format!("deployment/{TEST_DEPLOYMENT}: volume 'nope' not found"));
}

#[rstest]
fn test_add_patch(test_route: Route) {
    let file = objects_file(vec![Object::Deployment(test_deployment(TEST_DEPLOYMENT)), Object::Route(test_route)]);
    let args = Args {
        add: true,
        name: Some("cache".into()),
        mount_path: Some("/cache".into()),
        containers: TEST_CONTAINER.into(),
        output: Some(OutputFormat::Patch),
        ..args(&file)
    };
    let mut out: Vec<u8> = vec![];
    cmd(&args, &KsetConfig::default(), &mut out).unwrap();

    let lines = patch_lines(&out);
    assert_len_eq_x!(&lines, 1);
    assert_eq!(lines[0].0, format!("deployment/{TEST_DEPLOYMENT}"));
    let ops = lines[0].1.as_array().unwrap();
    assert_len_eq_x!(ops, 2);
    assert_contains!(
        ops,
        &json::json!({"op": "add", "path": "/spec/template/spec/volumes", "value": [{"name": "cache", "emptyDir": {}}]})
    );
    assert_contains!(
        ops,
        &json::json!({
            "op": "add",
            "path": "/spec/template/spec/containers/0/volumeMounts",
            "value": [{"name": "cache", "mountPath": "/cache"}],
        })
    );
}

#[rstest]
fn test_remove(test_route: Route) {
    let file = objects_file(vec![Object::Deployment(deployment_with_volumes()), Object::Route(test_route)]);
    let args = Args { remove: true, name: Some("data".into()), output: Some(OutputFormat::Yaml), ..args(&file) };
    let mut out: Vec<u8> = vec![];
    cmd(&args, &KsetConfig::default(), &mut out).unwrap();

    let objects = parse_objects(&String::from_utf8(out).unwrap()).unwrap();
    assert_len_eq_x!(&objects, 1);
    let spec = template_spec(&objects[0]);
    let names: Vec<_> = spec.volumes.iter().flatten().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["creds"]);
    assert_none!(&spec.containers[0].volume_mounts);
}

#[rstest]
fn test_overwrite_multiple_objects() {
    let file = objects_file(vec![Object::Deployment(deployment_with_volumes()), Object::Pod(test_pod(TEST_POD))]);
    let args = Args { add: true, overwrite: true, mount_path: Some("/data".into()), ..args(&file) };
    let mut out: Vec<u8> = vec![];
    let err = cmd(&args, &KsetConfig::default(), &mut out).unwrap_err();

    assert_contains!(format!("{err:#}"), "you must specify --name for the volume name when dealing with multiple");
    assert_is_empty!(out);
}

#[rstest]
fn test_single_object_without_pod_template(test_route: Route) {
    let file = objects_file(vec![Object::Route(test_route)]);
    let args = Args { add: true, ..args(&file) };
    let err = cmd(&args, &KsetConfig::default(), &mut Vec::<u8>::new()).unwrap_err();

    assert_eq!(err.to_string(), format!("route/{TEST_ROUTE} is not a pod or does not have a pod template"));
}

#[rstest]
#[case::two_operations(Args { add: true, remove: true, ..Default::default() }, "you may only specify one operation")]
#[case::list_with_output(
    Args { list: true, output: Some(OutputFormat::Json), ..Default::default() },
    "--list and --output may not be specified together"
)]
#[case::remove_without_confirm(Args { remove: true, ..Default::default() }, "must provide --confirm")]
#[case::add_only_flag(Args { secret_name: Some("creds".into()), ..Default::default() }, "--type|--path")]
fn test_invalid_args(#[case] args: Args, #[case] expected: &str) {
    let err = cmd(&args, &KsetConfig::default(), &mut Vec::<u8>::new()).unwrap_err();
    assert!(err.to_string().starts_with(expected));
}
