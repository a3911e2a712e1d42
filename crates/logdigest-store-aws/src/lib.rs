//! [`ObjectStore`] backed by the `aws` CLI.
//!
//! Credentials are read once from the access-key CSV the AWS console exports
//! and handed to every `aws` invocation through its environment. Nothing is
//! exported into the digest's own process environment.

use anyhow::{Context, Result};
use logdigest_error::{precondition, transfer_error};
use logdigest_ports::{ObjectStore, TransferReport};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_BUCKET: &str = "immuneaging";
pub const DEFAULT_PROGRAM: &str = "aws";

/// An access key pair.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AwsCredentials {
    #[serde(rename = "Access key ID")]
    pub access_key_id: String,
    #[serde(rename = "Secret access key")]
    pub secret_access_key: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

impl AwsCredentials {
    /// First row of an access-key CSV (`Access key ID`, `Secret access key`).
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("open credentials file {path:?}"))?;
        let creds: Self = reader
            .deserialize()
            .next()
            .ok_or_else(|| precondition("credentials file has no rows"))
            .with_context(|| format!("read credentials file {path:?}"))?
            .with_context(|| format!("parse credentials file {path:?}"))?;
        Ok(creds)
    }
}

/// Drives `aws s3 ls|sync|cp` against one bucket.
#[derive(Debug)]
pub struct AwsCliStore {
    program: PathBuf,
    bucket: String,
    credentials: AwsCredentials,
}

impl AwsCliStore {
    pub fn new(bucket: impl Into<String>, credentials: AwsCredentials) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            bucket: bucket.into(),
            credentials,
        }
    }

    /// Use a different `aws` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn url(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    pub fn list_args(&self, prefix: &str) -> Vec<String> {
        vec![
            "s3".into(),
            "ls".into(),
            self.url(prefix),
            "--recursive".into(),
        ]
    }

    pub fn sync_args(&self, remote_dir: &str, local_dir: &Path, file_name: &str) -> Vec<String> {
        vec![
            "s3".into(),
            "sync".into(),
            "--no-progress".into(),
            self.url(remote_dir),
            local_dir.display().to_string(),
            "--exclude".into(),
            "*".into(),
            "--include".into(),
            file_name.into(),
        ]
    }

    pub fn copy_args(&self, key: &str, local_path: &Path) -> Vec<String> {
        vec![
            "s3".into(),
            "cp".into(),
            self.url(key),
            local_path.display().to_string(),
        ]
    }

    /// Command line as a shell would read it, for logs.
    pub fn render(&self, args: &[String]) -> String {
        let mut out = self.program.display().to_string();
        for a in args {
            out.push(' ');
            if a.contains(['*', ' ']) {
                out.push('"');
                out.push_str(a);
                out.push('"');
            } else {
                out.push_str(a);
            }
        }
        out
    }

    /// Run the CLI and return its stdout. A non-zero exit is not an error:
    /// the caller decides what an empty answer means.
    fn run(&self, args: &[String]) -> Result<String> {
        let output = Command::new(&self.program)
            .args(args)
            .env("AWS_ACCESS_KEY_ID", &self.credentials.access_key_id)
            .env("AWS_SECRET_ACCESS_KEY", &self.credentials.secret_access_key)
            .output()
            .map_err(|e| transfer_error(format!("could not run {}: {e}", self.program.display())))
            .with_context(|| self.render(args))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            log::debug!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim_end()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Key column of an `aws s3 ls` line (`date time size key`).
pub fn key_of_listing_line(line: &str) -> Option<&str> {
    let mut rest = line.trim();
    for _ in 0..3 {
        let (_, tail) = rest.split_once(char::is_whitespace)?;
        rest = tail.trim_start();
    }
    (!rest.is_empty()).then_some(rest)
}

impl ObjectStore for AwsCliStore {
    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let stdout = self.run(&self.list_args(prefix))?;
        Ok(stdout
            .lines()
            .filter_map(key_of_listing_line)
            .map(str::to_string)
            .collect())
    }

    fn sync_file(
        &self,
        remote_dir: &str,
        local_dir: &Path,
        file_name: &str,
    ) -> Result<TransferReport> {
        let args = self.sync_args(remote_dir, local_dir, file_name);
        let response = self.run(&args)?;
        Ok(TransferReport {
            command: self.render(&args),
            response,
        })
    }

    fn copy(&self, key: &str, local_path: &Path) -> Result<TransferReport> {
        let args = self.copy_args(key, local_path);
        let response = self.run(&args)?;
        Ok(TransferReport {
            command: self.render(&args),
            response,
        })
    }
}
