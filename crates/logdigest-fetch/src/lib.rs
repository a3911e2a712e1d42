//! Fetches one object's log and turns it into a [`LogRecord`].
//!
//! Remote logs are synced one file at a time into the working directory and
//! remembered so [`LogFetcher::cleanup`] can remove them afterwards. A file
//! already sitting at the target path is removed before its sync. Local logs
//! are read in place. A log that is absent or empty becomes a record holding
//! only the NOT FOUND line; only I/O failures on the working directory are
//! errors.

use anyhow::Result;
use logdigest_error::io_error;
use logdigest_ids::{ObjectId, Version};
use logdigest_ports::{DigestDriver, ObjectStore, version_dir};
use logdigest_schema::record::{LogRecord, MissingReason};
use std::fs;
use std::path::{Path, PathBuf};

pub struct LogFetcher<'a> {
    store: Option<&'a dyn ObjectStore>,
    logs_dir: PathBuf,
    downloaded: Vec<PathBuf>,
}

impl<'a> LogFetcher<'a> {
    /// Fetch through `store`, downloading into `working_dir`.
    pub fn remote(store: &'a dyn ObjectStore, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: Some(store),
            logs_dir: working_dir.into(),
            downloaded: Vec::new(),
        }
    }

    /// Read logs already on disk under `logs_dir`.
    pub fn local(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: None,
            logs_dir: logs_dir.into(),
            downloaded: Vec::new(),
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Files this fetcher downloaded and has not cleaned up yet.
    pub fn downloaded(&self) -> &[PathBuf] {
        &self.downloaded
    }

    pub fn fetch(
        &mut self,
        driver: &dyn DigestDriver,
        object_id: &ObjectId,
        version: Version,
    ) -> Result<LogRecord> {
        let file_name = driver.log_file_name(object_id, &version);
        let path = self.logs_dir.join(&file_name);
        let missing = |reason| {
            log::error!("File not found: {}. Skipping.", path.display());
            Ok(LogRecord::missing(object_id.clone(), version, path.clone(), reason))
        };

        if let Some(store) = self.store {
            // Whatever sits at the target path predates this run.
            remove_stale(&path)?;
            if !version.is_resolved() {
                log::error!("no version found for {object_id}; nothing to sync");
                return missing(MissingReason::UnresolvedVersion);
            }
            let remote = version_dir(
                driver.remote_category(),
                &driver.object_prefix(object_id),
                &version,
            );
            if !self.sync(store, &remote, &file_name, &path) {
                return missing(MissingReason::FileAbsent);
            }
        }

        if !path.is_file() {
            let reason = if version.is_resolved() {
                MissingReason::FileAbsent
            } else {
                MissingReason::UnresolvedVersion
            };
            return missing(reason);
        }

        let lines = read_lines(&path)?;
        if lines.is_empty() {
            log::error!("Empty log: {}. Skipping.", path.display());
            return Ok(LogRecord::missing(
                object_id.clone(),
                version,
                path,
                MissingReason::EmptyLog,
            ));
        }
        Ok(LogRecord::found(object_id.clone(), version, path, lines))
    }

    /// Run the transfer and report whether it delivered anything. An empty
    /// response or a failed transfer counts as nothing delivered. Any file
    /// the transfer left behind is queued for cleanup either way.
    fn sync(&mut self, store: &dyn ObjectStore, remote: &str, file_name: &str, path: &Path) -> bool {
        log::info!("syncing {file_name}...");
        let delivered = match store.sync_file(remote, &self.logs_dir, file_name) {
            Ok(report) => {
                log::info!("sync_cmd: {}", report.command);
                if report.is_empty_response() {
                    log::error!("empty response from aws.");
                    false
                } else {
                    log::info!("aws response: {}", report.response.trim_end());
                    true
                }
            }
            Err(e) => {
                log::error!("sync of {file_name} failed: {e:#}");
                false
            }
        };
        if path.exists() && !self.downloaded.iter().any(|p| p == path) {
            self.downloaded.push(path.to_path_buf());
        }
        delivered
    }

    /// Delete every file this fetcher downloaded.
    ///
    /// Best effort: failures are logged and the remaining files are still
    /// attempted. Returns how many files were removed.
    pub fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.downloaded.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("could not remove {}: {e}", path.display()),
            }
        }
        if removed > 0 {
            log::debug!("removed {removed} downloaded log(s)");
        }
        removed
    }
}

/// Remove a file left at `path` by an earlier run.
fn remove_stale(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    log::debug!("removing stale {}", path.display());
    fs::remove_file(path)
        .map_err(|e| io_error(format!("remove stale {}: {e}", path.display())))?;
    Ok(())
}

/// Lines of a log file without line terminators.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).map_err(|e| io_error(format!("read {}: {e}", path.display())))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdigest_error::{ErrorCategory, category_of};
    use logdigest_schema::record::{FetchOutcome, not_found_line};
    use logdigest_testkit::{FakeDriver, MemoryStore, write_log};
    use tempfile::TempDir;

    #[test]
    fn local_present_file_is_read() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "fake.a_FAKE.v2.log", &["INFO one", "WARNING two"]);
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::local(dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(2))
            .unwrap();
        assert!(!rec.is_missing());
        assert_eq!(rec.lines, vec!["INFO one", "WARNING two"]);
        assert!(f.downloaded().is_empty());
    }

    #[test]
    fn local_absent_file_is_not_found_record() {
        let dir = TempDir::new().unwrap();
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::local(dir.path());

        let rec = f.fetch(&driver, &ObjectId::new("a"), Version::Unresolved).unwrap();
        assert!(rec.is_missing());
        assert_eq!(rec.lines, vec![not_found_line()]);
        assert_eq!(rec.file_name(), "fake.a_FAKE.v-1.log");
    }

    #[test]
    fn remote_fetch_syncs_exact_file_then_cleans_up() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new()
            .with_object("processed_fakes/a_FAKE/v3/fake.a_FAKE.v3.log", "ERROR boom\n");
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(3))
            .unwrap();
        assert_eq!(rec.lines, vec!["ERROR boom"]);
        assert_eq!(store.synced(), vec!["processed_fakes/a_FAKE/v3/fake.a_FAKE.v3.log"]);
        assert_eq!(f.downloaded().len(), 1);

        assert_eq!(f.cleanup(), 1);
        assert!(!dir.path().join("fake.a_FAKE.v3.log").exists());
        assert!(f.downloaded().is_empty());
    }

    #[test]
    fn remote_empty_response_is_missing_not_error() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();
        assert!(rec.is_missing());
        assert!(f.downloaded().is_empty());
    }

    #[test]
    fn unresolved_version_skips_the_transfer() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f.fetch(&driver, &ObjectId::new("a"), Version::Unresolved).unwrap();
        assert!(rec.is_missing());
        assert!(store.synced().is_empty());
    }

    #[test]
    fn cleanup_leaves_unrelated_files() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "keep.txt", &["mine"]);
        let store = MemoryStore::new()
            .with_object("processed_fakes/a_FAKE/v1/fake.a_FAKE.v1.log", "x\n");
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());
        f.fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();

        f.cleanup();
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn stale_file_is_replaced_then_cleaned_up() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "fake.a_FAKE.v1.log", &["INFO stale"]);
        let store = MemoryStore::new()
            .with_object("processed_fakes/a_FAKE/v1/fake.a_FAKE.v1.log", "INFO fresh\n");
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();
        assert_eq!(rec.lines, vec!["INFO fresh"]);
        assert_eq!(f.cleanup(), 1);
        assert!(!dir.path().join("fake.a_FAKE.v1.log").exists());
    }

    #[test]
    fn stale_file_is_not_read_after_empty_response() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "fake.a_FAKE.v1.log", &["INFO stale success"]);
        let store = MemoryStore::new();
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();
        assert_eq!(rec.outcome, FetchOutcome::Missing(MissingReason::FileAbsent));
        assert_eq!(rec.lines, vec![not_found_line()]);
        assert!(!dir.path().join("fake.a_FAKE.v1.log").exists());
    }

    #[test]
    fn failed_transfer_is_missing_even_with_stale_file() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "fake.a_FAKE.v1.log", &["INFO stale success"]);
        let store = MemoryStore::new()
            .with_object("processed_fakes/a_FAKE/v1/fake.a_FAKE.v1.log", "INFO fresh\n")
            .failing_sync();
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::remote(&store, dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();
        assert_eq!(rec.outcome, FetchOutcome::Missing(MissingReason::FileAbsent));
        assert!(f.downloaded().is_empty());
        assert!(!dir.path().join("fake.a_FAKE.v1.log").exists());
    }

    #[test]
    fn empty_log_is_missing() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "fake.a_FAKE.v1.log", &[]);
        let driver = FakeDriver::new(["a"]);
        let mut f = LogFetcher::local(dir.path());

        let rec = f
            .fetch(&driver, &ObjectId::new("a"), Version::Numbered(1))
            .unwrap();
        assert_eq!(rec.outcome, FetchOutcome::Missing(MissingReason::EmptyLog));
        assert_eq!(rec.lines, vec![not_found_line()]);
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_lines(dir.path()).unwrap_err();
        assert_eq!(category_of(&err), Some(ErrorCategory::Io));
    }

    #[test]
    fn crlf_lines_are_split_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, "a\r\nb\r\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b"]);
    }
}
