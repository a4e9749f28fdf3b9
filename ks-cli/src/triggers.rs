use std::io::Write;

use ks_core::config::{
    KsetConfig,
    OutputFormat,
};
use ks_core::errors::*;
use ks_core::patch::calculate_patches;
use ks_core::prelude::*;
use ks_core::triggers::{
    ImageStreamTagRef,
    TriggerDefinition,
    TriggerUpdate,
    effective_namespace,
    supports_triggers,
    update_triggers_for_object,
};
use tracing::*;

use crate::objects::read_objects;
use crate::output::{
    print_results,
    print_table,
};

#[derive(clap::Args, Default)]
pub struct Args {
    #[arg(short, long, long_help = "file containing the objects to update (- for stdin)")]
    pub filename: String,

    #[arg(long, long_help = "remove the specified trigger(s)")]
    pub remove: bool,

    #[arg(long, long_help = "remove all triggers")]
    pub remove_all: bool,

    #[arg(long, long_help = "set all triggers to automatic")]
    pub auto: bool,

    #[arg(long, long_help = "set all triggers to manual")]
    pub manual: bool,

    #[arg(long, long_help = "trigger on changes to the object's configuration")]
    pub from_config: bool,

    #[arg(long, long_help = "trigger on changes to an image stream tag ([namespace/]name:tag)")]
    pub from_image: Option<String>,

    #[arg(
        short,
        long,
        long_help = "comma-separated list of containers to update when --from-image changes",
        value_delimiter = ','
    )]
    pub containers: Vec<String>,

    #[arg(long, long_help = "add a GitHub webhook trigger")]
    pub from_github: bool,

    #[arg(long, long_help = "add a generic webhook trigger")]
    pub from_webhook: bool,

    #[arg(long, long_help = "add a generic webhook trigger that accepts environment variables")]
    pub from_webhook_allow_env: bool,

    #[arg(long, long_help = "add a GitLab webhook trigger")]
    pub from_gitlab: bool,

    #[arg(long, long_help = "add a Bitbucket webhook trigger")]
    pub from_bitbucket: bool,

    #[arg(short, long, long_help = "output format: yaml, json, or patch")]
    pub output: Option<OutputFormat>,
}

impl Args {
    fn to_update(&self) -> anyhow::Result<TriggerUpdate> {
        let from_image = match &self.from_image {
            Some(value) => Some(ImageStreamTagRef::parse(value, None)?),
            None => None,
        };

        Ok(TriggerUpdate {
            remove: self.remove,
            remove_all: self.remove_all,
            auto: self.auto,
            manual: self.manual,
            from_config: self.from_config,
            from_image,
            container_names: self.containers.clone(),
            from_github: self.from_github,
            from_webhook: self.from_webhook,
            from_webhook_allow_env: self.from_webhook_allow_env,
            from_gitlab: self.from_gitlab,
            from_bitbucket: self.from_bitbucket,
        })
    }
}

pub fn cmd(args: &Args, config: &KsetConfig, out: &mut impl Write) -> EmptyResult {
    let update = args.to_update()?;
    update.validate()?;

    let mut objects = read_objects(&args.filename)?;
    if update.is_print_only() {
        return print_triggers(out, &objects, config.default_namespace.as_deref());
    }

    let patches = calculate_patches(&mut objects, |obj| {
        if !supports_triggers(obj) {
            warn!("{} does not support triggers, skipping", obj.info());
        }

        let default_ns = config.default_namespace.as_deref();
        let update = update.for_namespace(effective_namespace(obj, default_ns).as_deref());
        update_triggers_for_object(obj, default_ns, |triggers| {
            update.apply(triggers);
            Ok(())
        })
    });
    print_results(out, patches, args.output.unwrap_or(config.output))
}

fn print_triggers(out: &mut impl Write, objects: &[Object], default_ns: Option<&str>) -> EmptyResult {
    let mut errs = AggregateError::default();
    let mut rows = vec![];
    for obj in objects.iter().filter(|o| supports_triggers(o)) {
        let info = obj.info();
        match TriggerDefinition::read(obj, default_ns) {
            Ok(triggers) => {
                rows.extend(triggers.rows().into_iter().map(|r| vec![info.to_string(), r.type_, r.value, r.auto]));
            },
            Err(err) => errs.push(err.context(info.to_string())),
        }
    }

    print_table(out, &["NAME", "TYPE", "VALUE", "AUTO"], &rows)?;
    errs.into_result()
}
