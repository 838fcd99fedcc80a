use std::path::{Path, PathBuf};

use anyhow::{Context as _, Error};
use clap::Parser;
use qdigest::QDigestConfig;
use serde::Deserialize;

use crate::input::parse_values;

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    /// Path to the check configuration file, in YAML format.
    pub config_path: PathBuf,

    /// Rank fractions to query, overriding those in the configuration file.
    ///
    /// Can be given multiple times.
    #[arg(long = "quantile", value_name = "FRACTION")]
    pub quantiles: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "mode", content = "value")]
pub enum InputSource {
    /// Values listed directly in the configuration.
    #[serde(rename = "inline")]
    Inline(Vec<u64>),

    /// Newline-separated values read from a file.
    ///
    /// Blank lines, and lines starting with `#`, are ignored.
    #[serde(rename = "file")]
    File(PathBuf),
}

impl InputSource {
    /// Loads the input values.
    ///
    /// # Errors
    ///
    /// If the input file cannot be read, or contains a line that is not an unsigned integer, an error is returned.
    pub fn load(&self) -> Result<Vec<u64>, Error> {
        match self {
            Self::Inline(values) => Ok(values.clone()),
            Self::File(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input file '{}'.", path.display()))?;
                parse_values(&raw).with_context(|| format!("Failed to parse input file '{}'.", path.display()))
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Digest parameters.
    pub digest: QDigestConfig,

    /// Where to read the input values from.
    pub input: InputSource,

    /// Rank fractions to query.
    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,
}

impl Config {
    /// Attempts to load a serialized `Config` from the given file path.
    ///
    /// # Errors
    ///
    /// If an error occurs while reading the file, or deserializing the configuration data, it will be returned.
    pub fn try_from_file<P>(config_path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let config_path = config_path.as_ref();
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file '{}'.", config_path.display()))?;

        Self::try_from_yaml(&raw)
            .with_context(|| format!("Failed to load configuration file '{}'.", config_path.display()))
    }

    fn try_from_yaml(raw: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(raw).context("Failed to deserialize configuration.")?;
        config.digest.validate().context("Invalid digest configuration.")?;

        Ok(config)
    }
}

fn default_quantiles() -> Vec<f64> {
    vec![0.25, 0.5, 0.75, 0.9, 0.99]
}
