use std::str::FromStr;

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde_json as json;
use tracing::*;

use crate::errors::*;
use crate::k8s::{
    Object,
    ObjectInfo,
    is_not_applicable,
    pod_spec_mut,
};
use crate::patch::Mutation;
use crate::prelude::*;

err_impl! {VolumeError,
    #[error("{0}")]
    Invalid(String),

    #[error("volume '{0}' not found")]
    NotFound(String),
}

pub const ALL_CONTAINERS: &str = "*";

const VOLUME_PREFIX: &str = "volume-";
const NAME_CHARS: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const NAME_SUFFIX_LEN: usize = 5;
const DEFAULT_MODE: &str = "0644";

lazy_static! {
    static ref DEFAULT_MODE_INPUT: Regex = Regex::new(r"^0?[0-7]{3}$").unwrap();
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum VolumeOp {
    #[default]
    List,
    Add,
    Remove,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VolumeSourceType {
    EmptyDir,
    HostPath,
    Secret,
    ConfigMap,
    PersistentVolumeClaim,
}

impl FromStr for VolumeSourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<VolumeSourceType> {
        match s.to_lowercase().as_str() {
            "emptydir" => Ok(VolumeSourceType::EmptyDir),
            "hostpath" => Ok(VolumeSourceType::HostPath),
            "secret" => Ok(VolumeSourceType::Secret),
            "configmap" => Ok(VolumeSourceType::ConfigMap),
            "persistentvolumeclaim" | "pvc" => Ok(VolumeSourceType::PersistentVolumeClaim),
            _ => Err(VolumeError::invalid(
                "invalid volume type. Supported types: emptyDir, hostPath, secret, configmap, persistentVolumeClaim",
            )),
        }
    }
}

// Everything that only makes sense when adding a volume
#[derive(Clone, Debug, Default)]
pub struct AddVolumeOptions {
    pub type_: Option<String>,
    pub mount_path: Option<String>,
    pub sub_path: Option<String>,
    pub default_mode: Option<String>,
    pub read_only: bool,
    pub overwrite: bool,

    pub path: Option<String>,
    pub config_map_name: Option<String>,
    pub secret_name: Option<String>,
    pub claim_name: Option<String>,
    pub source: Option<String>,
}

#[derive(Clone, Debug)]
pub struct VolumeUpdate {
    pub op: VolumeOp,
    pub name: Option<String>,
    pub containers: String,
    pub confirm: bool,
    pub add: AddVolumeOptions,

    // Shared by every object in a run, so that a generated name is the same everywhere
    pub generated_name: String,
}

impl Default for VolumeUpdate {
    fn default() -> VolumeUpdate {
        VolumeUpdate {
            op: VolumeOp::default(),
            name: None,
            containers: ALL_CONTAINERS.into(),
            confirm: false,
            add: AddVolumeOptions::default(),
            generated_name: String::new(),
        }
    }
}

impl AddVolumeOptions {
    // The explicit --type, or the one implied by the source flags; None means the volume comes
    // from --source
    pub fn source_type(&self) -> anyhow::Result<Option<VolumeSourceType>> {
        if let Some(type_) = &self.type_ {
            return type_.parse().map(Some);
        }

        let inferred = if self.claim_name.is_some() {
            Some(VolumeSourceType::PersistentVolumeClaim)
        } else if self.secret_name.is_some() {
            Some(VolumeSourceType::Secret)
        } else if self.config_map_name.is_some() {
            Some(VolumeSourceType::ConfigMap)
        } else if self.path.is_some() {
            Some(VolumeSourceType::HostPath)
        } else {
            None
        };

        match inferred {
            None if self.source.is_some() => Ok(None),
            None => Ok(Some(VolumeSourceType::EmptyDir)),
            t => Ok(t),
        }
    }

    fn type_changed(&self) -> bool {
        self.type_.is_some()
            || self.claim_name.is_some()
            || self.secret_name.is_some()
            || self.config_map_name.is_some()
            || self.path.is_some()
    }

    fn has_add_only_flags(&self) -> bool {
        self.type_changed() || self.source.is_some() || self.default_mode.is_some() || self.overwrite
    }

    fn validate(&self) -> EmptyResult {
        if self.type_changed() && self.source.is_some() {
            return Err(VolumeError::invalid("either specify --type or --source but not both for --add operation"));
        }

        let source_type = self.source_type()?;
        match source_type {
            Some(VolumeSourceType::HostPath) if self.path.is_none() => {
                return Err(VolumeError::invalid("must provide --path for --type=hostPath"))
            },
            Some(VolumeSourceType::Secret) if self.secret_name.is_none() => {
                return Err(VolumeError::invalid("must provide --secret-name for --type=secret"))
            },
            Some(VolumeSourceType::ConfigMap) if self.config_map_name.is_none() => {
                return Err(VolumeError::invalid("must provide --configmap-name for --type=configmap"))
            },
            Some(VolumeSourceType::PersistentVolumeClaim) if self.claim_name.is_none() => {
                return Err(VolumeError::invalid("must provide --claim-name for --type=persistentVolumeClaim"))
            },
            _ => (),
        }

        if let Some(mode) = &self.default_mode {
            if !matches!(source_type, Some(VolumeSourceType::Secret | VolumeSourceType::ConfigMap)) {
                return Err(VolumeError::invalid("--default-mode is only available for secrets and configmaps"));
            }
            if !DEFAULT_MODE_INPUT.is_match(mode) {
                return Err(VolumeError::invalid("--default-mode must be between 0000 and 0777"));
            }
        }

        if let Some(source) = &self.source {
            volume_from_source(source, "")?;
        }
        Ok(())
    }

    pub fn new_volume(&self, name: &str) -> anyhow::Result<corev1::Volume> {
        let Some(source_type) = self.source_type()? else {
            return volume_from_source(self.source.as_deref().unwrap_or_default(), name);
        };

        let mut volume = corev1::Volume { name: name.into(), ..Default::default() };
        match source_type {
            VolumeSourceType::EmptyDir => volume.empty_dir = Some(Default::default()),
            VolumeSourceType::HostPath => {
                volume.host_path = Some(corev1::HostPathVolumeSource {
                    path: self.path.clone().unwrap_or_default(),
                    ..Default::default()
                })
            },
            VolumeSourceType::Secret => {
                volume.secret = Some(corev1::SecretVolumeSource {
                    secret_name: self.secret_name.clone(),
                    default_mode: Some(self.default_mode()?),
                    ..Default::default()
                })
            },
            VolumeSourceType::ConfigMap => {
                volume.config_map = Some(corev1::ConfigMapVolumeSource {
                    name: self.config_map_name.clone().unwrap_or_default(),
                    default_mode: Some(self.default_mode()?),
                    ..Default::default()
                })
            },
            VolumeSourceType::PersistentVolumeClaim => {
                volume.persistent_volume_claim = Some(corev1::PersistentVolumeClaimVolumeSource {
                    claim_name: self.claim_name.clone().unwrap_or_default(),
                    ..Default::default()
                })
            },
        }
        Ok(volume)
    }

    fn default_mode(&self) -> anyhow::Result<i32> {
        Ok(i32::from_str_radix(self.default_mode.as_deref().unwrap_or(DEFAULT_MODE), 8)?)
    }
}

impl VolumeUpdate {
    pub fn validate(&self) -> EmptyResult {
        if self.op != VolumeOp::Add && self.add.has_add_only_flags() {
            return Err(VolumeError::invalid(
                "--type|--path|--configmap-name|--secret-name|--claim-name|--source|--default-mode|--overwrite \
                 are only valid for --add operation"
            ));
        }

        match self.op {
            VolumeOp::Remove if self.name.is_none() && !self.confirm => {
                return Err(VolumeError::invalid("must provide --confirm for removing more than one volume"))
            },
            VolumeOp::Add => self.add.validate(),
            _ => Ok(()),
        }
    }

    // `single_resource` says whether the run touches exactly one object, which is the only case
    // where --overwrite can find the volume by its mount path
    pub fn apply(&self, spec: &mut corev1::PodSpec, info: &ObjectInfo, single_resource: bool) -> EmptyResult {
        match self.op {
            VolumeOp::Add => self.add_volume(spec, info, single_resource),
            VolumeOp::Remove => self.remove_volume(spec, info),
            VolumeOp::List => Ok(()),
        }
    }

    fn add_volume(&self, spec: &mut corev1::PodSpec, info: &ObjectInfo, single_resource: bool) -> EmptyResult {
        let add = &self.add;
        let (name, claim_found) = self.volume_name(spec, single_resource)?;

        let volumes = spec.volumes.get_or_insert_with(Vec::new);
        match volumes.iter().position(|v| v.name == name) {
            Some(_) if !add.overwrite && !claim_found => {
                return Err(VolumeError::invalid(&format!("volume '{name}' already exists. Use --overwrite to replace")))
            },
            // Overwriting without a new type or source keeps the old source
            Some(i) if add.type_changed() || add.source.is_some() => volumes[i] = add.new_volume(&name)?,
            Some(_) => (),
            None => {
                if add.overwrite {
                    warn!("{info}: volume '{name}' did not previously exist and was not overwritten, creating it");
                }
                volumes.push(add.new_volume(&name)?);
            },
        }

        match &add.mount_path {
            Some(mount_path) => self.add_mount(spec, info, &name, mount_path),
            None => Ok(()),
        }
    }

    fn volume_name(&self, spec: &corev1::PodSpec, single_resource: bool) -> anyhow::Result<(String, bool)> {
        if let Some(name) = &self.name {
            return Ok((name.clone(), false));
        }

        let add = &self.add;
        if add.overwrite {
            if !single_resource {
                return Err(VolumeError::invalid(
                    "you must specify --name for the volume name when dealing with multiple resources"
                ));
            }
            let Some(mount_path) = &add.mount_path else {
                return Err(VolumeError::invalid("ambiguous --overwrite, specify --name or --mount-path"));
            };

            let mount_path = clean_path(mount_path);
            let (selected, _) = select_containers(&spec.containers, &self.containers);
            let names: Vec<_> = selected
                .iter()
                .filter_map(|&i| {
                    let mut mounts = spec.containers[i].volume_mounts.iter().flatten();
                    mounts.find(|m| clean_path(&m.mount_path) == mount_path).map(|m| m.name.clone())
                })
                .collect();

            return match names.as_slice() {
                [] => Err(VolumeError::invalid(&format!("unable to find the volume for mount-path: {mount_path}"))),
                [name] => Ok((name.clone(), false)),
                _ => Err(VolumeError::invalid(&format!("found multiple volumes with same mount-path: {mount_path}"))),
            };
        }

        if let Some(claim) = &add.claim_name {
            let existing = spec
                .volumes
                .iter()
                .flatten()
                .find(|v| v.persistent_volume_claim.as_ref().is_some_and(|pvc| &pvc.claim_name == claim));
            if let Some(volume) = existing {
                return Ok((volume.name.clone(), true));
            }
        }

        let name = if self.generated_name.is_empty() { generate_volume_name() } else { self.generated_name.clone() };
        info!("generated volume name: {name}");
        Ok((name, false))
    }

    fn add_mount(&self, spec: &mut corev1::PodSpec, info: &ObjectInfo, name: &str, mount_path: &str) -> EmptyResult {
        let (selected, _) = select_containers(&spec.containers, &self.containers);
        if selected.is_empty() && self.containers != ALL_CONTAINERS {
            warn!("{info} does not have any containers matching {:?}", self.containers);
            return Ok(());
        }

        let mount_path = clean_path(mount_path);
        for i in selected {
            let container = &mut spec.containers[i];
            let mounts = container.volume_mounts.get_or_insert_with(Vec::new);
            if mounts.iter().any(|m| m.name != name && clean_path(&m.mount_path) == mount_path) {
                return Err(VolumeError::invalid(&format!(
                    "volume mount '{mount_path}' already exists for container '{}'",
                    container.name
                )));
            }

            if self.add.overwrite {
                mounts.retain(|m| m.name != name);
            }
            mounts.push(corev1::VolumeMount {
                name: name.into(),
                mount_path: mount_path.clone(),
                read_only: self.add.read_only.then_some(true),
                sub_path: self.add.sub_path.as_deref().map(clean_path),
                ..Default::default()
            });
        }
        Ok(())
    }

    fn remove_volume(&self, spec: &mut corev1::PodSpec, info: &ObjectInfo) -> EmptyResult {
        let (selected, skipped) = select_containers(&spec.containers, &self.containers);
        if selected.is_empty() && self.containers != ALL_CONTAINERS {
            warn!("{info} does not have any containers matching {:?}", self.containers);
            return Ok(());
        }

        let Some(name) = &self.name else {
            for i in selected {
                spec.containers[i].volume_mounts = None;
            }
            spec.volumes = None;
            return Ok(());
        };

        for i in selected {
            remove_mounts(&mut spec.containers[i], name);
        }

        // The volume stays if a container outside the selection still mounts it
        if skipped.iter().any(|&i| mounts_volume(&spec.containers[i], name)) {
            return Ok(());
        }

        let Some(volumes) = spec.volumes.as_mut() else {
            return Err(VolumeError::not_found(name));
        };
        let Some(i) = volumes.iter().position(|v| &v.name == name) else {
            return Err(VolumeError::not_found(name));
        };
        volumes.remove(i);
        if volumes.is_empty() {
            spec.volumes = None;
        }
        Ok(())
    }

    // Lines describing each volume (or just the one named by --name) and where it's mounted
    pub fn describe(&self, spec: &corev1::PodSpec) -> anyhow::Result<Vec<String>> {
        let (selected, _) = select_containers(&spec.containers, &self.containers);
        let multiple_containers = spec.containers.len() > 1;

        let mut lines = vec![];
        let mut found = false;
        for volume in spec.volumes.iter().flatten() {
            if self.name.as_ref().is_some_and(|name| name != &volume.name) {
                continue;
            }
            found = true;

            lines.push(format!("  {} as {}", describe_volume_source(volume), volume.name));
            for &i in &selected {
                let container = &spec.containers[i];
                for mount in container.volume_mounts.iter().flatten().filter(|m| m.name == volume.name) {
                    let mut line = format!("    mounted at {}", mount.mount_path);
                    if multiple_containers {
                        line.push_str(&format!(" in container {}", container.name));
                    }
                    lines.push(line);
                }
            }
        }

        match &self.name {
            Some(name) if !found => Err(VolumeError::not_found(name)),
            _ => Ok(lines),
        }
    }
}

pub fn update_volumes_for_object<F>(obj: &mut Object, f: F) -> Mutation
where
    F: FnOnce(&mut corev1::PodSpec, &ObjectInfo) -> EmptyResult,
{
    let info = obj.info();
    match pod_spec_mut(obj) {
        Ok((spec, _)) => f(spec, &info).into(),
        Err(err) if is_not_applicable(&err) => Mutation::Unchanged,
        Err(err) => Mutation::Failed(err),
    }
}

pub fn generate_volume_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String =
        (0..NAME_SUFFIX_LEN).map(|_| NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())] as char).collect();
    format!("{VOLUME_PREFIX}{suffix}")
}

pub fn describe_volume_source(volume: &corev1::Volume) -> String {
    let access = |read_only: Option<bool>| if read_only == Some(true) { " read-only" } else { "" };

    if let Some(ebs) = &volume.aws_elastic_block_store {
        format!(
            "AWS EBS {} type={} partition={}{}",
            ebs.volume_id,
            ebs.fs_type.as_deref().unwrap_or_default(),
            ebs.partition.unwrap_or_default(),
            access(ebs.read_only)
        )
    } else if volume.empty_dir.is_some() {
        "empty directory".into()
    } else if let Some(pd) = &volume.gce_persistent_disk {
        format!(
            "GCE PD {} type={} partition={}{}",
            pd.pd_name,
            pd.fs_type.as_deref().unwrap_or_default(),
            pd.partition.unwrap_or_default(),
            access(pd.read_only)
        )
    } else if let Some(git) = &volume.git_repo {
        match git.revision.as_deref() {
            Some(rev) if !rev.is_empty() => format!("Git repository {} @ {rev}", git.repository),
            _ => format!("Git repository {}", git.repository),
        }
    } else if let Some(gfs) = &volume.glusterfs {
        format!("GlusterFS {}:{}{}", gfs.endpoints, gfs.path, access(gfs.read_only))
    } else if let Some(host_path) = &volume.host_path {
        format!("host path {}", host_path.path)
    } else if let Some(iscsi) = &volume.iscsi {
        format!(
            "ISCSI {} target-portal={} type={} lun={}{}",
            iscsi.iqn,
            iscsi.target_portal,
            iscsi.fs_type.as_deref().unwrap_or_default(),
            iscsi.lun,
            access(iscsi.read_only)
        )
    } else if let Some(nfs) = &volume.nfs {
        format!("NFS {}:{}{}", nfs.server, nfs.path, access(nfs.read_only))
    } else if let Some(pvc) = &volume.persistent_volume_claim {
        format!("pvc/{}{}", pvc.claim_name, access(pvc.read_only))
    } else if let Some(rbd) = &volume.rbd {
        format!(
            "Ceph RBD [{}] type={} image={} pool={}{}",
            rbd.monitors.join(" "),
            rbd.fs_type.as_deref().unwrap_or_default(),
            rbd.image,
            rbd.pool.as_deref().unwrap_or_default(),
            access(rbd.read_only)
        )
    } else if let Some(secret) = &volume.secret {
        format!("secret/{}", secret.secret_name.as_deref().unwrap_or_default())
    } else if let Some(config_map) = &volume.config_map {
        format!("configMap/{}", config_map.name)
    } else {
        "unknown".into()
    }
}

// Lexically normalizes a slash-separated path: repeated separators and `.` elements are dropped,
// and `..` eats the element before it
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = vec![];
    for part in path.split('/') {
        match part {
            "" | "." => (),
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            },
            ".." if rooted => (),
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".into(),
        (false, false) => joined,
    }
}

// Splits container indices into the ones whose names match the `*` glob and the rest
pub fn select_containers(containers: &[corev1::Container], pattern: &str) -> (Vec<usize>, Vec<usize>) {
    (0..containers.len()).partition(|&i| glob_match(pattern, &containers[i].name))
}

fn glob_match(pattern: &str, s: &str) -> bool {
    let Some((prefix, rest)) = pattern.split_once('*') else {
        return pattern == s;
    };
    let Some(mut s) = s.strip_prefix(prefix) else {
        return false;
    };

    let mut parts: Vec<_> = rest.split('*').collect();
    let last = parts.pop().unwrap_or_default();
    for part in parts {
        match s.find(part) {
            Some(i) => s = &s[i + part.len()..],
            None => return false,
        }
    }
    s.ends_with(last)
}

fn volume_from_source(source: &str, name: &str) -> anyhow::Result<corev1::Volume> {
    let value: json::Value =
        json::from_str(source).map_err(|err| VolumeError::invalid(&format!("invalid --source: {err}")))?;
    let json::Value::Object(mut map) = value else {
        return Err(VolumeError::invalid("must provide only one volume for --source"));
    };
    if map.len() != 1 {
        return Err(VolumeError::invalid("must provide only one volume for --source"));
    }

    map.insert("name".into(), json::Value::String(name.into()));
    json::from_value(json::Value::Object(map)).map_err(|err| VolumeError::invalid(&format!("invalid --source: {err}")))
}

fn remove_mounts(container: &mut corev1::Container, name: &str) {
    let Some(mounts) = container.volume_mounts.as_mut() else {
        return;
    };

    let before = mounts.len();
    mounts.retain(|m| m.name != name);
    if mounts.len() != before && mounts.is_empty() {
        container.volume_mounts = None;
    }
}

fn mounts_volume(container: &corev1::Container, name: &str) -> bool {
    container.volume_mounts.iter().flatten().any(|m| m.name == name)
}

#[cfg(test)]
mod tests;
