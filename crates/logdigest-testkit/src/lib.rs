//! Small helpers for building fixtures in tests.
//!
//! Keeping these in a microcrate avoids copy-paste across resolver, fetch,
//! aggregate and engine tests.

pub mod strategies;

use anyhow::{Context, Result, bail};
use logdigest_ids::{ObjectId, Version};
use logdigest_ports::{
    DigestDriver, DigestMode, MetadataSource, ObjectStore, SampleRecord, TransferReport,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Write `lines` (newline-terminated) to `dir/name` and return the path.
pub fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::new();
    for l in lines {
        text.push_str(l);
        text.push('\n');
    }
    fs::write(&path, text).unwrap_or_else(|e| panic!("write fixture {path:?}: {e}"));
    path
}

pub fn sample_record(donor_id: &str, sample_id: &str) -> SampleRecord {
    SampleRecord {
        sample_id: sample_id.to_string(),
        donor_id: donor_id.to_string(),
        ..SampleRecord::default()
    }
}

/// Bucket held in memory.
///
/// Records every prefix listed and every file synced, so tests can assert on
/// the calls the code under test made.
#[derive(Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, String>,
    listed: RefCell<Vec<String>>,
    synced: RefCell<Vec<String>>,
    fail_listing: bool,
    fail_sync: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, key: &str, body: &str) -> Self {
        self.objects.insert(key.to_string(), body.to_string());
        self
    }

    /// Make every `list` call fail, as an unreachable bucket would.
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make every `sync_file` call fail, as a missing `aws` binary would.
    pub fn failing_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    pub fn listed(&self) -> Vec<String> {
        self.listed.borrow().clone()
    }

    /// Remote paths of every `sync_file` call, found or not.
    pub fn synced(&self) -> Vec<String> {
        self.synced.borrow().clone()
    }

    fn download(&self, key: &str, local_path: &Path) -> Result<TransferReport> {
        let command = format!("memory cp {key} {}", local_path.display());
        let Some(body) = self.objects.get(key) else {
            return Ok(TransferReport {
                command,
                response: String::new(),
            });
        };
        fs::write(local_path, body).with_context(|| format!("write {local_path:?}"))?;
        Ok(TransferReport {
            command,
            response: format!("download: {key} to {}", local_path.display()),
        })
    }
}

impl ObjectStore for MemoryStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.listed.borrow_mut().push(prefix.to_string());
        if self.fail_listing {
            bail!("bucket unreachable");
        }
        Ok(self
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn sync_file(
        &self,
        remote_dir: &str,
        local_dir: &Path,
        file_name: &str,
    ) -> Result<TransferReport> {
        let key = format!("{remote_dir}/{file_name}");
        self.synced.borrow_mut().push(key.clone());
        if self.fail_sync {
            bail!("could not run transfer for {key}");
        }
        self.download(&key, &local_dir.join(file_name))
    }

    fn copy(&self, key: &str, local_path: &Path) -> Result<TransferReport> {
        self.download(key, local_path)
    }
}

/// Driver over a fixed id list, naming logs `fake.{id}_FAKE.{version}.log`.
pub struct FakeDriver {
    pub ids: Vec<ObjectId>,
    pub unsupported: Vec<DigestMode>,
}

impl FakeDriver {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(ObjectId::new).collect(),
            unsupported: Vec::new(),
        }
    }

    pub fn without(mut self, mode: DigestMode) -> Self {
        self.unsupported.push(mode);
        self
    }
}

impl DigestDriver for FakeDriver {
    fn name(&self) -> &str {
        "fake"
    }

    fn object_ids(&self) -> Result<Vec<ObjectId>> {
        Ok(self.ids.clone())
    }

    fn object_prefix(&self, object_id: &ObjectId) -> String {
        format!("{object_id}_FAKE")
    }

    fn log_file_name(&self, object_id: &ObjectId, version: &Version) -> String {
        format!("fake.{}.{version}.log", self.object_prefix(object_id))
    }

    fn remote_category(&self) -> &str {
        "processed_fakes"
    }

    fn supports(&self, mode: DigestMode) -> bool {
        !self.unsupported.contains(&mode)
    }
}

/// Samples sheet held in memory.
#[derive(Default)]
pub struct StaticMetadata {
    pub samples: Vec<SampleRecord>,
}

impl StaticMetadata {
    pub fn new(samples: Vec<SampleRecord>) -> Self {
        Self { samples }
    }
}

impl MetadataSource for StaticMetadata {
    fn samples_for_donor(&self, donor_id: &str) -> Result<Vec<SampleRecord>> {
        Ok(self
            .samples
            .iter()
            .filter(|s| s.donor_id == donor_id)
            .cloned()
            .collect())
    }
}
