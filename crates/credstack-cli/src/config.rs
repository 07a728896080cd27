//! # CLI Configuration
//!
//! Optional YAML or JSON file passed with `--config`. Every key has a
//! default, and command-line flags override file values.
//!
//! ```yaml
//! resolve:
//!   lenient_numbers: true
//!   null_as_absent: false
//!   max_reference_depth: 8
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use credstack_schema::{DocumentFormat, ResolveOptions};

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub resolve: ResolveOptions,
}

impl CliConfig {
    /// Read a `.json`, `.yaml` or `.yml` config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = match DocumentFormat::from_path(path) {
            Some(DocumentFormat::Json) => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON config: {}", path.display()))?,
            Some(DocumentFormat::Yaml) => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config: {}", path.display()))?,
            None => bail!(
                "unsupported config file {}: expected .json, .yaml or .yml",
                path.display()
            ),
        };
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    /// The file at `path`, or the defaults when no file is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Resolver flags shared by subcommands that resolve payloads.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveFlags {
    /// Accept numeric strings for number and integer fields.
    #[arg(long)]
    pub lenient_numbers: bool,

    /// Treat null values as absent fields.
    #[arg(long)]
    pub null_as_absent: bool,

    /// Maximum $ref nesting depth.
    #[arg(long, value_name = "N")]
    pub max_reference_depth: Option<usize>,
}

impl ResolveFlags {
    /// Layer the flags that were given over `base`.
    pub fn apply(&self, base: ResolveOptions) -> ResolveOptions {
        ResolveOptions {
            lenient_numbers: base.lenient_numbers || self.lenient_numbers,
            null_as_absent: base.null_as_absent || self.null_as_absent,
            max_reference_depth: self.max_reference_depth.unwrap_or(base.max_reference_depth),
        }
    }
}
