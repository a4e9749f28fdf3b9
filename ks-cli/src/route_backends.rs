use std::io::Write;

use ks_core::backends::{
    BackendInput,
    BackendTransform,
    Backends,
    update_backends_for_object,
};
use ks_core::config::{
    KsetConfig,
    OutputFormat,
};
use ks_core::patch::calculate_patches;
use ks_core::prelude::*;

use crate::objects::read_objects;
use crate::output::{
    print_results,
    print_table,
};

#[derive(clap::Args, Default)]
pub struct Args {
    #[arg(short, long, long_help = "file containing the routes to update (- for stdin)")]
    pub filename: String,

    #[arg(long_help = "backend weights: NAME=WEIGHT, NAME=WEIGHT%, or NAME=[+-]WEIGHT[%] with --adjust")]
    pub backends: Vec<String>,

    #[arg(long, long_help = "set the weight of every backend to zero")]
    pub zero: bool,

    #[arg(long, long_help = "give every backend the same weight")]
    pub equal: bool,

    #[arg(long, long_help = "adjust the weight of a single backend relative to the others")]
    pub adjust: bool,

    #[arg(short, long, long_help = "output format: yaml, json, or patch")]
    pub output: Option<OutputFormat>,
}

pub fn cmd(args: &Args, config: &KsetConfig, out: &mut impl Write) -> EmptyResult {
    let inputs = args.backends.iter().map(|b| BackendInput::parse(b)).collect::<anyhow::Result<Vec<_>>>()?;
    let transform = BackendTransform {
        zero: args.zero,
        equal: args.equal,
        adjust: args.adjust,
        inputs,
        default_weight: config.default_backend_weight,
    };
    transform.validate()?;

    let mut objects = read_objects(&args.filename)?;
    if transform.is_print_only() {
        return print_backends(out, &objects, config.default_backend_weight);
    }

    let patches = calculate_patches(&mut objects, |obj| update_backends_for_object(obj, |b| transform.apply(b)));
    print_results(out, patches, args.output.unwrap_or(config.output))
}

fn print_backends(out: &mut impl Write, objects: &[Object], default_weight: i32) -> EmptyResult {
    let mut rows = vec![];
    for obj in objects {
        let Object::Route(route) = obj else { continue };
        let info = obj.info().to_string();
        for row in Backends::from_route(route).rows(default_weight) {
            let weight = format!("{} ({})", row.weight, row.percentage);
            rows.push(vec![info.clone(), row.kind, row.name, weight.trim_start().to_string()]);
        }
    }
    print_table(out, &["NAME", "KIND", "TO", "WEIGHT"], &rows)
}
