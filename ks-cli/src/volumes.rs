use std::io::Write;

use ks_core::config::{
    KsetConfig,
    OutputFormat,
};
use ks_core::errors::*;
use ks_core::k8s::{
    has_pod_spec,
    pod_spec,
};
use ks_core::patch::calculate_patches;
use ks_core::prelude::*;
use ks_core::volumes::{
    ALL_CONTAINERS,
    AddVolumeOptions,
    VolumeOp,
    VolumeUpdate,
    generate_volume_name,
    update_volumes_for_object,
};

use crate::objects::read_objects;
use crate::output::print_results;

#[derive(clap::Args)]
pub struct Args {
    #[arg(short, long, long_help = "file containing the objects to update (- for stdin)")]
    pub filename: String,

    #[arg(long, long_help = "add a volume and optionally mount it")]
    pub add: bool,

    #[arg(long, long_help = "remove a volume and its mounts")]
    pub remove: bool,

    #[arg(long, long_help = "list volumes and mounts (the default)")]
    pub list: bool,

    #[arg(long, long_help = "name of the volume; generated when adding if not given")]
    pub name: Option<String>,

    #[arg(short, long, default_value = ALL_CONTAINERS, long_help = "containers to change, as a glob with *")]
    pub containers: String,

    #[arg(long, long_help = "confirm that every volume should be removed")]
    pub confirm: bool,

    #[arg(short = 't', long = "type", long_help = "volume type: emptyDir, hostPath, secret, configmap, or pvc")]
    pub type_: Option<String>,

    #[arg(short, long, long_help = "path the volume is mounted at in each container")]
    pub mount_path: Option<String>,

    #[arg(long, long_help = "path within the volume to mount")]
    pub sub_path: Option<String>,

    #[arg(long, long_help = "mount the volume read-only")]
    pub read_only: bool,

    #[arg(long, long_help = "replace an existing volume")]
    pub overwrite: bool,

    #[arg(long, long_help = "host path for a hostPath volume")]
    pub path: Option<String>,

    #[arg(long = "configmap-name", long_help = "name of the config map for a configmap volume")]
    pub config_map_name: Option<String>,

    #[arg(long, long_help = "name of the secret for a secret volume")]
    pub secret_name: Option<String>,

    #[arg(long, long_help = "name of the claim for a persistentVolumeClaim volume")]
    pub claim_name: Option<String>,

    #[arg(long, long_help = "octal permission bits for a secret or configmap volume (default 0644)")]
    pub default_mode: Option<String>,

    #[arg(long, long_help = "JSON description of a single volume source, e.g. '{\"emptyDir\": {}}'")]
    pub source: Option<String>,

    #[arg(short, long, long_help = "output format: yaml, json, or patch")]
    pub output: Option<OutputFormat>,
}

impl Default for Args {
    fn default() -> Args {
        Args {
            filename: String::new(),
            add: false,
            remove: false,
            list: false,
            name: None,
            containers: ALL_CONTAINERS.into(),
            confirm: false,
            type_: None,
            mount_path: None,
            sub_path: None,
            read_only: false,
            overwrite: false,
            path: None,
            config_map_name: None,
            secret_name: None,
            claim_name: None,
            default_mode: None,
            source: None,
            output: None,
        }
    }
}

impl Args {
    fn to_update(&self) -> anyhow::Result<VolumeUpdate> {
        let op = match (self.add, self.remove, self.list) {
            (false, false, _) => VolumeOp::List,
            (true, false, false) => VolumeOp::Add,
            (false, true, false) => VolumeOp::Remove,
            _ => bail!("you may only specify one operation at a time"),
        };
        if self.list && self.output.is_some() {
            bail!("--list and --output may not be specified together");
        }

        Ok(VolumeUpdate {
            op,
            name: self.name.clone(),
            containers: self.containers.clone(),
            confirm: self.confirm,
            add: AddVolumeOptions {
                type_: self.type_.clone(),
                mount_path: self.mount_path.clone(),
                sub_path: self.sub_path.clone(),
                default_mode: self.default_mode.clone(),
                read_only: self.read_only,
                overwrite: self.overwrite,
                path: self.path.clone(),
                config_map_name: self.config_map_name.clone(),
                secret_name: self.secret_name.clone(),
                claim_name: self.claim_name.clone(),
                source: self.source.clone(),
            },
            generated_name: generate_volume_name(),
        })
    }
}

pub fn cmd(args: &Args, config: &KsetConfig, out: &mut impl Write) -> EmptyResult {
    let update = args.to_update()?;
    update.validate()?;

    let mut objects = read_objects(&args.filename)?;
    if update.op == VolumeOp::List {
        return print_volumes(out, &objects, &update);
    }

    let single_resource = objects.len() == 1;
    if single_resource && !has_pod_spec(&objects[0]) {
        bail!("{} is not a pod or does not have a pod template", objects[0].info());
    }

    let patches = calculate_patches(&mut objects, |obj| {
        update_volumes_for_object(obj, |spec, info| update.apply(spec, info, single_resource))
    });
    print_results(out, patches, args.output.unwrap_or(config.output))
}

fn print_volumes(out: &mut impl Write, objects: &[Object], update: &VolumeUpdate) -> EmptyResult {
    let mut errs = AggregateError::default();
    for obj in objects {
        let Ok((spec, _)) = pod_spec(obj) else { continue };
        let info = obj.info();
        match update.describe(spec) {
            Ok(lines) => {
                writeln!(out, "{info}")?;
                for line in lines {
                    writeln!(out, "{line}")?;
                }
            },
            Err(err) => errs.push(err.context(info.to_string())),
        }
    }
    errs.into_result()
}
