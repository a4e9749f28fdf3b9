use serde_json::{
    self as json,
    json,
};

use super::*;

#[rstest]
fn test_describe(spec_with_volumes: corev1::PodSpec) {
    let lines = VolumeUpdate::default().describe(&spec_with_volumes).unwrap();
    assert_eq!(lines, vec![
        "  empty directory as data",
        "    mounted at /data in container web",
        "    mounted at /data in container sidecar",
        "  pvc/db read-only as claim",
        "    mounted at /var/lib/db in container web",
    ]);
}

#[rstest]
fn test_describe_single_container() {
    let mut spec =
        corev1::PodSpec { containers: vec![test_container(TEST_CONTAINER, TEST_IMAGE)], ..Default::default() };
    let update = VolumeUpdate {
        name: Some("cache".into()),
        ..add(AddVolumeOptions { mount_path: Some("/cache".into()), ..Default::default() })
    };
    update.apply(&mut spec, &test_info(), true).unwrap();

    let list = VolumeUpdate { name: Some("cache".into()), ..Default::default() };
    assert_eq!(list.describe(&spec).unwrap(), vec!["  empty directory as cache", "    mounted at /cache"]);
}

#[rstest]
fn test_describe_selected_containers(spec_with_volumes: corev1::PodSpec) {
    let list =
        VolumeUpdate { name: Some("data".into()), containers: TEST_SIDECAR_CONTAINER.into(), ..Default::default() };
    assert_eq!(list.describe(&spec_with_volumes).unwrap(), vec![
        "  empty directory as data",
        "    mounted at /data in container sidecar",
    ]);
}

#[rstest]
fn test_describe_missing(spec_with_volumes: corev1::PodSpec) {
    let list = VolumeUpdate { name: Some("nope".into()), ..Default::default() };
    let err = list.describe(&spec_with_volumes).unwrap_err();
    assert_eq!(err.to_string(), "volume 'nope' not found");
}

#[rstest]
#[case::host_path(json!({"hostPath": {"path": "/var/log"}}), "host path /var/log")]
#[case::secret(json!({"secret": {"secretName": "creds"}}), "secret/creds")]
#[case::config_map(json!({"configMap": {"name": "settings"}}), "configMap/settings")]
#[case::git(
    json!({"gitRepo": {"repository": "https://example.com/app.git", "revision": "main"}}),
    "Git repository https://example.com/app.git @ main"
)]
#[case::nfs(
    json!({"nfs": {"server": "nfs.example.com", "path": "/exports", "readOnly": true}}),
    "NFS nfs.example.com:/exports read-only"
)]
#[case::rbd(
    json!({"rbd": {"monitors": ["m1", "m2"], "image": "img", "fsType": "ext4"}}),
    "Ceph RBD [m1 m2] type=ext4 image=img pool="
)]
#[case::gce(json!({"gcePersistentDisk": {"pdName": "disk", "partition": 1}}), "GCE PD disk type= partition=1")]
#[case::unknown(json!({"downwardAPI": {}}), "unknown")]
fn test_describe_volume_source(#[case] source: json::Value, #[case] expected: &str) {
    let mut value = source;
    value["name"] = json!("v");
    let volume: corev1::Volume = json::from_value(value).unwrap();
    assert_eq!(describe_volume_source(&volume), expected);
}
