use std::collections::BTreeMap;
use std::io::Write;

use ks_core::config::{
    KsetConfig,
    OutputFormat,
};
use ks_core::errors::*;
use ks_core::k8s::is_not_applicable;
use ks_core::mutators::{
    ImageReference,
    image_reference_mutator,
};
use ks_core::patch::{
    Mutation,
    calculate_patches,
};
use ks_core::prelude::*;
use tracing::*;

use crate::objects::{
    find_object,
    read_objects,
};
use crate::output::print_results;

#[derive(clap::Args, Default)]
pub struct Args {
    #[arg(short, long, long_help = "file containing the objects to update (- for stdin)")]
    pub filename: String,

    #[arg(
        long,
        long_help = "previous version of the objects; references that haven't changed since then are left alone"
    )]
    pub old: Option<String>,

    #[arg(long = "map", long_help = "rewrite references to image FROM so they point at TO (FROM=TO)", required = true)]
    pub mappings: Vec<String>,

    #[arg(short, long, long_help = "output format: yaml, json, or patch")]
    pub output: Option<OutputFormat>,
}

pub(crate) fn parse_mappings(mappings: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();
    for mapping in mappings {
        match mapping.split_once('=') {
            Some((from, to)) if !from.is_empty() && !to.is_empty() => {
                if result.insert(from.to_string(), to.to_string()).is_some() {
                    bail!("image {from} is mapped more than once");
                }
            },
            _ => bail!("invalid mapping {mapping:?}: expected FROM=TO"),
        }
    }
    Ok(result)
}

pub fn cmd(args: &Args, config: &KsetConfig, out: &mut impl Write) -> EmptyResult {
    let mappings = parse_mappings(&args.mappings)?;
    let mut objects = read_objects(&args.filename)?;
    let old_objects = match &args.old {
        Some(filename) => read_objects(filename)?,
        None => vec![],
    };

    let patches = calculate_patches(&mut objects, |obj| {
        let info = obj.info();
        let old = find_object(&old_objects, &info);
        if args.old.is_some() && old.is_none() {
            debug!("no previous version of {info}, checking every reference");
        }

        let mut mutator = match image_reference_mutator(obj, old) {
            Ok(m) => m,
            Err(err) if is_not_applicable(&err) => {
                info!("skipping {info}: {err}");
                return Mutation::Unchanged;
            },
            Err(err) => return Mutation::Failed(err),
        };

        let errs = mutator.mutate(&mut |image_ref: &mut ImageReference| {
            if let Some(to) = mappings.get(&image_ref.name) {
                debug!("{info}: {image_ref} -> {to}");
                image_ref.name = to.clone();
            }
            Ok(())
        });
        errs.into_result().into()
    });
    print_results(out, patches, args.output.unwrap_or(config.output))
}
