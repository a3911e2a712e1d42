//! Orchestration engine for a digestion run.
//!
//! Wires a driver, an optional object store and the run context into the
//! three digest actions. Logs are collected once per action: ids from the
//! driver, a version per id, then one fetch per id, in metadata order.
//! Downloaded files are removed before the action returns, whether it
//! succeeded or not.

use anyhow::{Context, Result};
use logdigest_aggregate::{build_library_rows, build_sample_rows, select};
use logdigest_classify::{LinePredicate, is_alertable};
use logdigest_error::{precondition, unsupported};
use logdigest_fetch::LogFetcher;
use logdigest_ids::LibraryType;
use logdigest_ports::{DigestDriver, DigestMode, ObjectStore};
use logdigest_render::{append_library_csv, write_sample_csv, write_text_digest};
use logdigest_resolver::{DEFAULT_PROBE_MAX, VersionResolver};
use logdigest_schema::context::{LogSource, RunContext};
use logdigest_schema::digest::{LibraryMetricsRow, SampleDigestRow};
use logdigest_schema::record::LogRecord;
use logdigest_template::qc::{LibraryProbes, SampleProbes};
use std::io::Write;
use std::path::Path;

pub const NOTHING_RELEVANT: &str = "No relevant log lines were found.";

pub struct Engine<'a> {
    pub driver: &'a dyn DigestDriver,
    pub store: Option<&'a dyn ObjectStore>,
    pub ctx: &'a RunContext,
    pub probe_max_version: u32,
}

impl<'a> Engine<'a> {
    pub fn new(
        driver: &'a dyn DigestDriver,
        store: Option<&'a dyn ObjectStore>,
        ctx: &'a RunContext,
    ) -> Self {
        Self {
            driver,
            store,
            ctx,
            probe_max_version: DEFAULT_PROBE_MAX,
        }
    }

    pub fn with_probe_max_version(mut self, max: u32) -> Self {
        self.probe_max_version = max;
        self
    }

    fn require(&self, mode: DigestMode, action: &str) -> Result<()> {
        if self.driver.supports(mode) {
            return Ok(());
        }
        Err(unsupported(format!(
            "{action} is not available for {} logs",
            self.driver.name()
        ))
        .into())
    }

    /// Resolve and fetch every object's log.
    pub fn collect_logs(&self) -> Result<Vec<LogRecord>> {
        let (resolver, mut fetcher) = match &self.ctx.source {
            LogSource::Remote { working_dir, .. } => {
                let store = self.store.ok_or_else(|| {
                    precondition("remote logs requested but no object store is configured")
                })?;
                (
                    VersionResolver::remote(store),
                    LogFetcher::remote(store, working_dir),
                )
            }
            LogSource::Local { logs_dir } => (
                VersionResolver::local(logs_dir, self.probe_max_version),
                LogFetcher::local(logs_dir),
            ),
        };

        let result = self.fetch_all(&resolver, &mut fetcher);
        fetcher.cleanup();
        result
    }

    fn fetch_all(
        &self,
        resolver: &VersionResolver<'_>,
        fetcher: &mut LogFetcher<'_>,
    ) -> Result<Vec<LogRecord>> {
        let driver = self.driver;
        let ids = driver
            .object_ids()
            .with_context(|| format!("list {} objects of donor {}", driver.name(), self.ctx.donor_id))?;
        if ids.is_empty() {
            log::warn!(
                "no {} objects found for donor {}",
                driver.name(),
                self.ctx.donor_id
            );
        }

        let mut records = Vec::with_capacity(ids.len());
        for id in &ids {
            let prefix = driver.object_prefix(id);
            let version = resolver
                .resolve(
                    driver.remote_category(),
                    &prefix,
                    self.ctx.version_for_prefix(&prefix),
                    |v| driver.log_file_name(id, v),
                )
                .with_context(|| format!("resolve version of {id}"))?;
            let record = fetcher
                .fetch(driver, id, version)
                .with_context(|| format!("fetch log of {id} ({version})"))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Print each log's alertable lines, or those matching `predicate` when
    /// given. Returns how many logs had something to show.
    pub fn print_digest<W: Write>(
        &self,
        out: &mut W,
        predicate: Option<&dyn LinePredicate>,
    ) -> Result<usize> {
        self.require(DigestMode::Text, "print_digest")?;
        let records = self.collect_logs()?;
        let selections = match predicate {
            Some(p) => select(&records, p),
            None => select(&records, &is_alertable),
        };

        if selections.is_empty() {
            log::info!("{NOTHING_RELEVANT}");
        } else {
            log::info!("Found the following relevant log lines.");
            write_text_digest(out, &selections)?;
        }
        Ok(selections.len())
    }

    /// Write the sample digest CSV to `out`.
    pub fn digest_csv<W: Write>(&self, out: W) -> Result<Vec<SampleDigestRow>> {
        self.require(DigestMode::SampleCsv, "get_csv")?;
        let probes = SampleProbes::compile()?;
        let records = self.collect_logs()?;
        let rows = build_sample_rows(&records, &probes);
        write_sample_csv(out, &rows)?;
        Ok(rows)
    }

    /// Append library metrics rows to `csv_path`, keeping only `lib_types`
    /// when given.
    pub fn lib_metrics_csv(
        &self,
        csv_path: &Path,
        lib_types: Option<&[LibraryType]>,
    ) -> Result<Vec<LibraryMetricsRow>> {
        self.require(DigestMode::LibraryMetrics, "get_lib_metrics_csv")?;
        let probes = LibraryProbes::compile()?;
        let records = self.collect_logs()?;
        let rows = build_library_rows(&records, &probes, lib_types);
        append_library_csv(csv_path, &rows)?;
        log::info!("appended {} row(s) to {}", rows.len(), csv_path.display());
        Ok(rows)
    }
}
