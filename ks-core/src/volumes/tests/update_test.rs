use tracing_test::traced_test;

use super::*;

#[rstest]
fn test_add_empty_dir() {
    let mut spec = test_pod_spec();
    let update = add(AddVolumeOptions { mount_path: Some("/cache//tmp/".into()), ..Default::default() });
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec![TEST_GENERATED_NAME]);
    assert_some!(&find_volume(&spec, TEST_GENERATED_NAME).empty_dir);
    for container in &spec.containers {
        assert_eq!(mounts(container), vec![(TEST_GENERATED_NAME, "/cache/tmp")]);
    }
    assert_none!(&spec.init_containers.as_ref().unwrap()[0].volume_mounts);
}

#[rstest]
#[case::secret(
    AddVolumeOptions { secret_name: Some("creds".into()), ..Default::default() },
    0o644
)]
#[case::config_map(
    AddVolumeOptions {
        config_map_name: Some("settings".into()),
        default_mode: Some("0600".into()),
        ..Default::default()
    },
    0o600
)]
fn test_add_default_mode(#[case] opts: AddVolumeOptions, #[case] expected: i32) {
    let mut spec = test_pod_spec();
    let update = VolumeUpdate { name: Some("conf".into()), ..add(opts) };
    update.apply(&mut spec, &test_info(), true).unwrap();

    let volume = find_volume(&spec, "conf");
    let mode = match (&volume.secret, &volume.config_map) {
        (Some(secret), None) => secret.default_mode,
        (None, Some(config_map)) => config_map.default_mode,
        _ => panic!("unexpected volume source: {volume:?}"),
    };
    assert_some_eq_x!(mode, expected);
}

#[rstest]
fn test_add_from_source() {
    let mut spec = test_pod_spec();
    let update = VolumeUpdate {
        name: Some("shared".into()),
        ..add(AddVolumeOptions {
            source: Some(r#"{"nfs": {"server": "nfs.example.com", "path": "/exports"}}"#.into()),
            ..Default::default()
        })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    let volume = find_volume(&spec, "shared");
    assert_eq!(volume.nfs.as_ref().unwrap().server, "nfs.example.com");
    assert_none!(&volume.empty_dir);
}

#[rstest]
fn test_add_read_only_sub_path() {
    let mut spec = test_pod_spec();
    let update = VolumeUpdate {
        containers: TEST_CONTAINER.into(),
        ..add(AddVolumeOptions {
            mount_path: Some("/etc/app".into()),
            sub_path: Some("a/./b/".into()),
            read_only: true,
            ..Default::default()
        })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    let mount = &spec.containers[0].volume_mounts.as_ref().unwrap()[0];
    assert_some_eq_x!(mount.read_only, true);
    assert_some_eq_x!(mount.sub_path.as_deref(), "a/b");
    assert_none!(&spec.containers[1].volume_mounts);
}

#[rstest]
fn test_add_existing_name(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate { name: Some("data".into()), ..add(Default::default()) };
    let err = update.apply(&mut spec, &test_info(), true).unwrap_err();

    assert_eq!(err.to_string(), "volume 'data' already exists. Use --overwrite to replace");
}

#[rstest]
fn test_add_overwrite_keeps_source(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate {
        name: Some("data".into()),
        containers: TEST_CONTAINER.into(),
        ..add(AddVolumeOptions { mount_path: Some("/new".into()), overwrite: true, ..Default::default() })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["data", "claim"]);
    assert_some!(&find_volume(&spec, "data").empty_dir);
    assert_eq!(mounts(&spec.containers[0]), vec![("claim", "/var/lib/db"), ("data", "/new")]);
    assert_eq!(mounts(&spec.containers[1]), vec![("data", "/data")]);
}

#[rstest]
fn test_add_overwrite_replaces_source(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate {
        name: Some("data".into()),
        ..add(AddVolumeOptions { secret_name: Some("creds".into()), overwrite: true, ..Default::default() })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    let volume = find_volume(&spec, "data");
    assert_none!(&volume.empty_dir);
    assert_some_eq_x!(volume.secret.as_ref().and_then(|s| s.secret_name.as_deref()), "creds");
}

#[rstest]
fn test_add_overwrite_by_mount_path(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = add(AddVolumeOptions {
        mount_path: Some("/var/lib/db/".into()),
        claim_name: Some("other".into()),
        overwrite: true,
        ..Default::default()
    });
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["data", "claim"]);
    assert_eq!(find_volume(&spec, "claim").persistent_volume_claim.as_ref().unwrap().claim_name, "other");
    assert_eq!(mounts(&spec.containers[0]), vec![("data", "/data"), ("claim", "/var/lib/db")]);
}

#[rstest]
#[case::multiple_resources(Some("/var/lib/db"), false, "you must specify --name for the volume name")]
#[case::no_mount_path(None, true, "ambiguous --overwrite, specify --name or --mount-path")]
#[case::unknown_mount_path(Some("/nowhere"), true, "unable to find the volume for mount-path: /nowhere")]
#[case::shared_mount_path(Some("/data"), true, "found multiple volumes with same mount-path: /data")]
fn test_add_overwrite_invalid(
    spec_with_volumes: corev1::PodSpec,
    #[case] mount_path: Option<&str>,
    #[case] single_resource: bool,
    #[case] expected: &str,
) {
    let mut spec = spec_with_volumes;
    let update =
        add(AddVolumeOptions { mount_path: mount_path.map(String::from), overwrite: true, ..Default::default() });
    let err = update.apply(&mut spec, &test_info(), single_resource).unwrap_err();

    assert_starts_with!(err.to_string(), expected);
}

#[rstest]
#[traced_test]
fn test_add_overwrite_missing_volume() {
    let mut spec = test_pod_spec();
    let update =
        VolumeUpdate { name: Some("fresh".into()), ..add(AddVolumeOptions { overwrite: true, ..Default::default() }) };
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["fresh"]);
    assert!(logs_contain("did not previously exist"));
}

#[rstest]
fn test_add_reuses_claim_volume(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate {
        containers: TEST_SIDECAR_CONTAINER.into(),
        ..add(AddVolumeOptions { claim_name: Some("db".into()), mount_path: Some("/db".into()), ..Default::default() })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["data", "claim"]);
    assert_eq!(mounts(&spec.containers[1]), vec![("data", "/data"), ("claim", "/db")]);
}

#[rstest]
fn test_add_mount_conflict(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate {
        name: Some("cache".into()),
        ..add(AddVolumeOptions { mount_path: Some("/data/".into()), ..Default::default() })
    };
    let err = update.apply(&mut spec, &test_info(), true).unwrap_err();

    assert_eq!(err.to_string(), "volume mount '/data' already exists for container 'web'");
}

#[rstest]
#[traced_test]
fn test_add_no_matching_containers() {
    let mut spec = test_pod_spec();
    let update = VolumeUpdate {
        containers: "db*".into(),
        ..add(AddVolumeOptions { mount_path: Some("/cache".into()), ..Default::default() })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec![TEST_GENERATED_NAME]);
    assert!(spec.containers.iter().all(|c| c.volume_mounts.is_none()));
    assert!(logs_contain("does not have any containers matching"));
}

#[rstest]
fn test_remove_named(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    remove(Some("data")).apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["claim"]);
    assert_eq!(mounts(&spec.containers[0]), vec![("claim", "/var/lib/db")]);
    assert_none!(&spec.containers[1].volume_mounts);
}

#[rstest]
fn test_remove_named_still_mounted(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let update = VolumeUpdate { containers: TEST_CONTAINER.into(), ..remove(Some("data")) };
    update.apply(&mut spec, &test_info(), true).unwrap();

    assert_eq!(volume_names(&spec), vec!["data", "claim"]);
    assert_eq!(mounts(&spec.containers[0]), vec![("claim", "/var/lib/db")]);
    assert_eq!(mounts(&spec.containers[1]), vec![("data", "/data")]);
}

#[rstest]
fn test_remove_last_volume(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    remove(Some("claim")).apply(&mut spec, &test_info(), true).unwrap();
    remove(Some("data")).apply(&mut spec, &test_info(), true).unwrap();

    assert_none!(&spec.volumes);
    assert!(spec.containers.iter().all(|c| c.volume_mounts.is_none()));
}

#[rstest]
fn test_remove_all(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    remove(None).apply(&mut spec, &test_info(), true).unwrap();

    assert_none!(&spec.volumes);
    assert!(spec.containers.iter().all(|c| c.volume_mounts.is_none()));
}

#[rstest]
fn test_remove_missing(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes;
    let err = remove(Some("nope")).apply(&mut spec, &test_info(), true).unwrap_err();
    assert_eq!(err.to_string(), "volume 'nope' not found");
}

#[rstest]
fn test_list_does_not_modify(spec_with_volumes: corev1::PodSpec) {
    let mut spec = spec_with_volumes.clone();
    VolumeUpdate::default().apply(&mut spec, &test_info(), true).unwrap();
    assert_eq!(spec, spec_with_volumes);
}

#[rstest]
fn test_update_volumes_for_object(test_deployment: appsv1::Deployment, test_route: Route) {
    let update = add(AddVolumeOptions { mount_path: Some("/cache".into()), ..Default::default() });

    let mut obj = Object::Deployment(test_deployment);
    let res = update_volumes_for_object(&mut obj, |spec, info| update.apply(spec, info, true));
    assert!(matches!(res, Mutation::Changed));
    let (spec, _) = crate::k8s::pod_spec(&obj).unwrap();
    assert_eq!(volume_names(spec), vec![TEST_GENERATED_NAME]);

    let mut obj = Object::Route(test_route);
    let res = update_volumes_for_object(&mut obj, |spec, info| update.apply(spec, info, true));
    assert!(matches!(res, Mutation::Unchanged));
}

#[rstest]
fn test_update_volumes_for_object_failed(spec_with_volumes: corev1::PodSpec) {
    let mut pod = test_pod(TEST_POD);
    pod.spec = Some(spec_with_volumes);
    let mut obj = Object::Pod(pod);
    let res = update_volumes_for_object(&mut obj, |spec, info| remove(Some("nope")).apply(spec, info, true));

    let Mutation::Failed(err) = res else { panic!("expected a failure") };
    assert!(matches!(err.downcast_ref::<VolumeError>(), Some(VolumeError::NotFound(_))));
}
