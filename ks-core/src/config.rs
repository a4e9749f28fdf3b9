use std::fmt;
use std::fs::File;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::*;
use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    Patch,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<OutputFormat> {
        match s {
            "yaml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            "patch" => Ok(OutputFormat::Patch),
            _ => bail!("unknown output format {s:?} (accepts: yaml, json, patch)"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
            OutputFormat::Patch => "patch",
        };
        write!(f, "{s}")
    }
}

// Defaults for the command line; anything given as a flag wins over what's in here
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct KsetConfig {
    pub default_namespace: Option<String>,
    pub default_backend_weight: i32,
    pub output: OutputFormat,
}

impl Default for KsetConfig {
    fn default() -> KsetConfig {
        KsetConfig {
            default_namespace: None,
            default_backend_weight: DEFAULT_BACKEND_WEIGHT,
            output: OutputFormat::default(),
        }
    }
}

impl KsetConfig {
    pub fn load(filename: &str) -> anyhow::Result<KsetConfig> {
        let config: KsetConfig = serde_yaml::from_reader(File::open(filename)?)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> EmptyResult {
        ensure!(
            (0..=MAX_BACKEND_WEIGHT).contains(&self.default_backend_weight),
            "defaultBackendWeight must be between 0 and {MAX_BACKEND_WEIGHT}, got {}",
            self.default_backend_weight
        );
        Ok(())
    }
}
