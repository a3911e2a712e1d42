//! Configuration management and run-context validation for logdigest.
//!
//! Two layers: an optional tool config file (YAML or JSON, chosen by
//! extension) holding deployment settings, and the positional run arguments,
//! which are validated into a [`RunContext`] before any work starts.

use anyhow::{Context, Result};
use logdigest_error::{DigestError, parse_error, precondition};
use logdigest_ids::VersionSpec;
use logdigest_logging::LogLevel;
use logdigest_schema::context::{LogSource, RunContext};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `logs_location` value that selects the object store.
pub const REMOTE_LOCATION: &str = "aws";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Deployment settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Bucket holding `processed_samples/` and `processed_libraries/`.
    pub bucket: String,

    /// Exported Samples sheet (CSV, or TSV by extension).
    pub samples_sheet: Option<PathBuf>,

    /// `aws` executable.
    pub aws_cli: PathBuf,

    pub log_level: LogLevel,

    /// Highest version probed when reading logs from local disk.
    pub probe_max_version: u32,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            bucket: "immuneaging".to_string(),
            samples_sheet: None,
            aws_cli: PathBuf::from("aws"),
            log_level: LogLevel::Info,
            probe_max_version: 8,
        }
    }
}

impl DigestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(precondition("bucket must not be empty").into());
        }
        if self.probe_max_version == 0 {
            return Err(precondition("probe_max_version must be at least 1").into());
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<DigestConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("read config {path:?}"))?;
    let config: DigestConfig = match ConfigFormat::of(path) {
        ConfigFormat::Json => serde_json::from_str(&contents)
            .map_err(|e| parse_error(format!("parse JSON config {path:?}: {e}")))?,
        ConfigFormat::Yaml => {
            if contents.trim().is_empty() {
                DigestConfig::default()
            } else {
                serde_yaml::from_str(&contents)
                    .map_err(|e| parse_error(format!("parse YAML config {path:?}: {e}")))?
            }
        }
    };
    config.validate()?;
    Ok(config)
}

pub fn save_config(config: &DigestConfig, path: &Path) -> Result<()> {
    let contents = match ConfigFormat::of(path) {
        ConfigFormat::Json => {
            serde_json::to_string_pretty(config).context("serialize JSON config")?
        }
        ConfigFormat::Yaml => serde_yaml::to_string(config).context("serialize YAML config")?,
    };
    std::fs::write(path, contents).with_context(|| format!("write config {path:?}"))?;
    Ok(())
}

/// The positional run arguments, exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub donor_id: String,
    pub seq_run: String,
    pub logs_location: String,
    pub version: String,
    pub version_ir: String,
    pub working_dir: String,
    pub s3_access_file: String,
}

fn parse_version(field: &str, raw: &str) -> Result<VersionSpec, DigestError> {
    raw.parse::<VersionSpec>().map_err(|e| {
        precondition(format!("{field}: {e}")).with_context(field, raw)
    })
}

impl RunArgs {
    /// Check every argument and build the run context.
    ///
    /// - `version` is `vN` or `latest`; `latest` needs `logs_location == aws`.
    /// - `version_ir` is `vN`, `latest`, or empty for "same as `version`".
    /// - `logs_location` is `aws` or an existing absolute directory.
    /// - with `aws`, `working_dir` must be an existing directory and
    ///   `s3_access_file` an existing file; otherwise both must be empty.
    pub fn into_context(self) -> Result<RunContext> {
        let remote = self.logs_location == REMOTE_LOCATION;

        if self.donor_id.trim().is_empty() {
            return Err(precondition("donor_id must not be empty").into());
        }

        let version = parse_version("version", &self.version)?;
        let version_ir = if self.version_ir.trim().is_empty() {
            version
        } else {
            parse_version("version_ir", &self.version_ir)?
        };
        if (version.is_latest() || version_ir.is_latest()) && !remote {
            return Err(precondition("\"latest\" can only be used with logs_location aws")
                .with_context("logs_location", &self.logs_location)
                .into());
        }

        let source = if remote {
            let working_dir = PathBuf::from(&self.working_dir);
            if self.working_dir.is_empty() || !working_dir.is_dir() {
                return Err(precondition("working_dir must be an existing directory")
                    .with_context("working_dir", &self.working_dir)
                    .into());
            }
            let credentials_file = PathBuf::from(&self.s3_access_file);
            if self.s3_access_file.is_empty() || !credentials_file.is_file() {
                return Err(precondition("s3_access_file must be an existing file")
                    .with_context("s3_access_file", &self.s3_access_file)
                    .into());
            }
            LogSource::Remote {
                working_dir,
                credentials_file,
            }
        } else {
            let logs_dir = PathBuf::from(&self.logs_location);
            if !logs_dir.is_absolute() || !logs_dir.is_dir() {
                return Err(precondition(
                    "logs_location must be \"aws\" or an existing absolute directory",
                )
                .with_context("logs_location", &self.logs_location)
                .into());
            }
            if !self.working_dir.is_empty() || !self.s3_access_file.is_empty() {
                return Err(precondition(
                    "working_dir and s3_access_file must be empty for local logs",
                )
                .with_context("working_dir", &self.working_dir)
                .with_context("s3_access_file", &self.s3_access_file)
                .into());
            }
            LogSource::Local { logs_dir }
        };

        Ok(RunContext {
            donor_id: self.donor_id,
            seq_run: self.seq_run,
            source,
            version,
            version_ir,
        })
    }
}
