//! Version resolution.
//!
//! Every processing run of an object writes its log under a new `vN`. Before a
//! log can be fetched the digest has to decide which N to read:
//!
//! - an explicit `vN` from the command line is used as given;
//! - `latest` takes the highest N present in the remote listing;
//! - logs on local disk are probed from `v1` upwards and the first hit wins.
//!
//! Nothing found resolves to [`Version::Unresolved`], which the fetcher turns
//! into a NOT FOUND record.

use anyhow::{Context, Result};
use logdigest_ids::{Version, VersionSpec};
use logdigest_ports::{ObjectStore, object_namespace};
use regex::Regex;
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Versions probed on local disk, in order.
pub const DEFAULT_PROBE_MAX: u32 = 8;

pub const LATEST_WARNING: &str = "*** Be wary of using the \"latest\" option as it can hide failures. For example if you expect the latest to be N and some library failed, we would grab the latest version that succeeded (<N) and report success. If you know the version you expect, provide it explicitly. ***";

const VERSIONED_LOG: &str = r"\.v(\d+)\.log$";

/// Highest `.vN.log` version among `keys`.
///
/// Keys may be bare names or full `aws s3 ls` lines; only the suffix matters.
pub fn latest_from_listing<S: AsRef<str>>(keys: &[S]) -> Result<Version> {
    let re = Regex::new(VERSIONED_LOG).context("compile versioned log pattern")?;
    Ok(keys
        .iter()
        .filter_map(|k| re.captures(k.as_ref().trim_end()))
        .filter_map(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .max()
        .map_or(Version::Unresolved, Version::Numbered))
}

/// First of `v1..=max` for which `file_name(v)` exists under `dir`.
pub fn probe_local<F>(dir: &Path, max: u32, file_name: F) -> Version
where
    F: Fn(&Version) -> String,
{
    (1..=max)
        .map(Version::Numbered)
        .find(|v| dir.join(file_name(v)).is_file())
        .unwrap_or(Version::Unresolved)
}

/// Where version lookups go.
pub enum Lookup<'a> {
    Remote(&'a dyn ObjectStore),
    Local { logs_dir: PathBuf, probe_max: u32 },
}

/// Resolves versions for one digestion run.
pub struct VersionResolver<'a> {
    lookup: Lookup<'a>,
    warned_latest: Cell<bool>,
}

impl<'a> VersionResolver<'a> {
    pub fn remote(store: &'a dyn ObjectStore) -> Self {
        Self {
            lookup: Lookup::Remote(store),
            warned_latest: Cell::new(false),
        }
    }

    pub fn local(logs_dir: impl Into<PathBuf>, probe_max: u32) -> Self {
        Self {
            lookup: Lookup::Local {
                logs_dir: logs_dir.into(),
                probe_max,
            },
            warned_latest: Cell::new(false),
        }
    }

    /// Version to read for the object stored under `{category}/{prefix}`.
    ///
    /// Local lookups ignore `spec` and always probe; `file_name` builds the log
    /// name for a candidate version.
    pub fn resolve<F>(
        &self,
        category: &str,
        prefix: &str,
        spec: VersionSpec,
        file_name: F,
    ) -> Result<Version>
    where
        F: Fn(&Version) -> String,
    {
        match (&self.lookup, spec) {
            (
                Lookup::Local {
                    logs_dir,
                    probe_max,
                },
                _,
            ) => Ok(probe_local(logs_dir, *probe_max, file_name)),
            (Lookup::Remote(_), VersionSpec::Exact(v)) => Ok(v),
            (Lookup::Remote(store), VersionSpec::Latest) => {
                self.warn_latest_once();
                let namespace = object_namespace(category, prefix);
                let keys = match store.list(&namespace) {
                    Ok(keys) => keys,
                    Err(e) => {
                        log::error!("could not list {namespace}: {e:#}");
                        Vec::new()
                    }
                };
                let version = latest_from_listing(&keys)?;
                log::debug!("latest version of {prefix}: {version}");
                Ok(version)
            }
        }
    }

    fn warn_latest_once(&self) {
        if !self.warned_latest.replace(true) {
            log::warn!("{LATEST_WARNING}");
        }
    }
}
