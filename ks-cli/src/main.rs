mod image_refs;
mod objects;
mod output;
mod route_backends;
mod triggers;
mod volumes;

use clap::{
    Parser,
    Subcommand,
    crate_version,
};
use ks_core::config::KsetConfig;
use ks_core::logging;
use ks_core::prelude::*;

#[derive(Parser)]
#[command(
    about = "command-line app for editing build, deployment, and route objects",
    version,
    propagate_version = true
)]
struct KsetCommandRoot {
    #[command(subcommand)]
    subcommand: KsetSubcommand,

    #[arg(short, long, default_value = "warn")]
    verbosity: String,

    #[arg(long, long_help = "YAML file with defaults for namespace, backend weight, and output format")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum KsetSubcommand {
    #[command(about = "rewrite image references in pod and build specs", visible_alias = "images")]
    ImageRefs(image_refs::Args),

    #[command(about = "print or change the backends of a route", visible_alias = "backends")]
    RouteBackends(route_backends::Args),

    #[command(about = "print or change the triggers on an object")]
    Triggers(triggers::Args),

    #[command(about = "list, add, or remove volumes in objects with a pod template", visible_alias = "volume")]
    Volumes(volumes::Args),

    #[command(about = "kset version")]
    Version,
}

fn main() -> EmptyResult {
    let args = KsetCommandRoot::parse();
    logging::setup_for_cli(&args.verbosity);

    let config = match &args.config {
        Some(filename) => KsetConfig::load(filename)?,
        None => KsetConfig::default(),
    };

    let mut stdout = std::io::stdout().lock();
    match &args.subcommand {
        KsetSubcommand::ImageRefs(args) => image_refs::cmd(args, &config, &mut stdout),
        KsetSubcommand::RouteBackends(args) => route_backends::cmd(args, &config, &mut stdout),
        KsetSubcommand::Triggers(args) => triggers::cmd(args, &config, &mut stdout),
        KsetSubcommand::Volumes(args) => volumes::cmd(args, &config, &mut stdout),
        KsetSubcommand::Version => {
            println!("kset {}", crate_version!());
            Ok(())
        },
    }
}

#[cfg(test)]
mod tests;
