mod describe_test;
mod update_test;

use assertables::*;
use ks_testutils::*;
use rstest::*;

use super::*;

const TEST_GENERATED_NAME: &str = "volume-bcd42";

fn test_info() -> ObjectInfo {
    Object::Pod(test_pod(TEST_POD)).info()
}

fn mount(name: &str, path: &str) -> corev1::VolumeMount {
    corev1::VolumeMount { name: name.into(), mount_path: path.into(), ..Default::default() }
}

// `web` mounts both volumes; `sidecar` only mounts `data`
#[fixture]
fn spec_with_volumes() -> corev1::PodSpec {
    let mut spec = test_pod_spec();
    spec.volumes = Some(vec![
        corev1::Volume { name: "data".into(), empty_dir: Some(Default::default()), ..Default::default() },
        corev1::Volume {
            name: "claim".into(),
            persistent_volume_claim: Some(corev1::PersistentVolumeClaimVolumeSource {
                claim_name: "db".into(),
                read_only: Some(true),
            }),
            ..Default::default()
        },
    ]);
    spec.containers[0].volume_mounts = Some(vec![mount("data", "/data"), mount("claim", "/var/lib/db")]);
    spec.containers[1].volume_mounts = Some(vec![mount("data", "/data")]);
    spec
}

fn add(opts: AddVolumeOptions) -> VolumeUpdate {
    VolumeUpdate { op: VolumeOp::Add, add: opts, generated_name: TEST_GENERATED_NAME.into(), ..Default::default() }
}

fn remove(name: Option<&str>) -> VolumeUpdate {
    VolumeUpdate { op: VolumeOp::Remove, name: name.map(String::from), confirm: name.is_none(), ..Default::default() }
}

fn volume_names(spec: &corev1::PodSpec) -> Vec<&str> {
    spec.volumes.iter().flatten().map(|v| v.name.as_str()).collect()
}

fn find_volume<'a>(spec: &'a corev1::PodSpec, name: &str) -> &'a corev1::Volume {
    spec.volumes.iter().flatten().find(|v| v.name == name).unwrap()
}

fn mounts(container: &corev1::Container) -> Vec<(&str, &str)> {
    container.volume_mounts.iter().flatten().map(|m| (m.name.as_str(), m.mount_path.as_str())).collect()
}
