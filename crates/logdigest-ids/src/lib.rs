use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Identifiers used across the digestion pipeline.
///
/// An object is either a sample (`"1234"`) or a typed library (`"GEX_1234"`).
/// Ids are opaque: the drivers decide how they map to prefixes and file names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Library object id, tagged with its type: `GEX_1234`.
    pub fn library(lib_type: LibraryType, lib_id: &str) -> Self {
        Self(format!("{}_{}", lib_type, lib_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A per-object revision tag.
///
/// Processing scripts write `vN` with N >= 1. Anything the resolver could not
/// pin down is `Unresolved`, which renders as `v-1` so that the file name built
/// from it can never exist on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Version {
    Numbered(u32),
    Unresolved,
}

impl Version {
    pub fn number(&self) -> Option<u32> {
        match self {
            Version::Numbered(n) => Some(*n),
            Version::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Version::Numbered(_))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Version::Unresolved, Version::Unresolved) => Ordering::Equal,
            (Version::Unresolved, Version::Numbered(_)) => Ordering::Less,
            (Version::Numbered(_), Version::Unresolved) => Ordering::Greater,
            (Version::Numbered(a), Version::Numbered(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Numbered(n) => write!(f, "v{n}"),
            Version::Unresolved => write!(f, "v-1"),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    /// Accepts `vN` (N >= 1). Both historical "not found" spellings, `v-1` and
    /// `-1`, parse to `Unresolved`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "v-1" || s == "-1" {
            return Ok(Version::Unresolved);
        }
        let digits = s
            .strip_prefix('v')
            .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }
        let n: u32 = digits
            .parse()
            .map_err(|_| VersionError::InvalidNumber(s.to_string()))?;
        if n == 0 {
            return Err(VersionError::InvalidNumber(s.to_string()));
        }
        Ok(Version::Numbered(n))
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Error type for version parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    InvalidFormat(String),
    InvalidNumber(String),
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidFormat(s) => {
                write!(f, "invalid version {s:?}: expected `v<N>` or `latest`")
            }
            VersionError::InvalidNumber(s) => {
                write!(f, "invalid version {s:?}: N must be a positive integer")
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// What the caller asked for on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionSpec {
    /// Highest version available in the remote listing.
    Latest,
    Exact(Version),
}

impl VersionSpec {
    pub fn is_latest(&self) -> bool {
        matches!(self, VersionSpec::Latest)
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "latest" {
            return Ok(VersionSpec::Latest);
        }
        match s.parse::<Version>()? {
            Version::Unresolved => Err(VersionError::InvalidNumber(s.to_string())),
            v => Ok(VersionSpec::Exact(v)),
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Latest => write!(f, "latest"),
            VersionSpec::Exact(v) => v.fmt(f),
        }
    }
}

/// Library modality as written in the Samples sheet and in library prefixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LibraryType {
    #[serde(rename = "GEX")]
    Gex,
    #[serde(rename = "BCR")]
    Bcr,
    #[serde(rename = "TCR")]
    Tcr,
}

impl LibraryType {
    /// Enumeration order used when collecting a donor's libraries.
    pub const ALL: [LibraryType; 3] = [LibraryType::Gex, LibraryType::Bcr, LibraryType::Tcr];

    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::Gex => "GEX",
            LibraryType::Bcr => "BCR",
            LibraryType::Tcr => "TCR",
        }
    }
}

impl fmt::Display for LibraryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GEX" => Ok(LibraryType::Gex),
            "BCR" => Ok(LibraryType::Bcr),
            "TCR" => Ok(LibraryType::Tcr),
            other => Err(format!("unknown library type {other:?} (expected GEX, BCR or TCR)")),
        }
    }
}

/// Strip any directory components, leaving the bare log file name.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Prefix component of a log file name: `process_sample.{prefix}.{version}.log`.
fn prefix_of(file_name: &str) -> Option<&str> {
    file_name_of(file_name).split('.').nth(1)
}

/// Sample id from `process_sample.{sample_id}_GEX.{version}.log`.
pub fn sample_id_from_file_name(file_name: &str) -> Option<&str> {
    prefix_of(file_name)?.split('_').next()
}

/// `(lib_type, lib_id)` from `process_library.{donor}_{seq_run}_{type}_{id}.{version}.log`.
///
/// Positional: the id is the last `_` component and the type the one before it,
/// whatever the donor and seq run ids look like.
pub fn library_from_file_name(file_name: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = prefix_of(file_name)?.split('_').collect();
    if parts.len() < 2 {
        return None;
    }
    Some((parts[parts.len() - 2], parts[parts.len() - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_numbered() {
        assert_eq!("v3".parse::<Version>().unwrap(), Version::Numbered(3));
        assert_eq!("v10".parse::<Version>().unwrap(), Version::Numbered(10));
    }

    #[test]
    fn both_sentinels_normalize_to_unresolved() {
        assert_eq!("v-1".parse::<Version>().unwrap(), Version::Unresolved);
        assert_eq!("-1".parse::<Version>().unwrap(), Version::Unresolved);
        assert_eq!(Version::Unresolved.to_string(), "v-1");
    }

    #[test]
    fn version_rejects_garbage() {
        assert!("3".parse::<Version>().is_err());
        assert!("v".parse::<Version>().is_err());
        assert!("v0".parse::<Version>().is_err());
        assert!("vx".parse::<Version>().is_err());
        assert!("V3".parse::<Version>().is_err());
    }

    #[test]
    fn version_order_is_numeric() {
        assert!(Version::Numbered(10) > Version::Numbered(2));
        assert!(Version::Unresolved < Version::Numbered(1));
    }

    #[test]
    fn version_spec_parsing() {
        assert_eq!("latest".parse::<VersionSpec>().unwrap(), VersionSpec::Latest);
        assert_eq!(
            "v2".parse::<VersionSpec>().unwrap(),
            VersionSpec::Exact(Version::Numbered(2))
        );
        assert!("v-1".parse::<VersionSpec>().is_err());
    }

    #[test]
    fn sample_id_from_log_name() {
        assert_eq!(
            sample_id_from_file_name("process_sample.1234_GEX.v3.log"),
            Some("1234")
        );
        assert_eq!(
            sample_id_from_file_name("/tmp/work.dir/process_sample.1234_GEX.v3.log"),
            Some("1234")
        );
        assert_eq!(sample_id_from_file_name("no_dots_here"), None);
    }

    #[test]
    fn library_from_log_name() {
        assert_eq!(
            library_from_file_name("process_library.D1_S1_BCR_5678.v2.log"),
            Some(("BCR", "5678"))
        );
        assert_eq!(
            library_from_file_name("process_library.582C_001_GEX_CZI-IA10244332.v-1.log"),
            Some(("GEX", "CZI-IA10244332"))
        );
        assert_eq!(library_from_file_name("process_library.solo.v1.log"), None);
    }

    #[test]
    fn library_object_id() {
        assert_eq!(ObjectId::library(LibraryType::Tcr, "42").as_str(), "TCR_42");
    }

    #[test]
    fn library_type_round_trips_through_str() {
        for t in LibraryType::ALL {
            assert_eq!(t.as_str().parse::<LibraryType>().unwrap(), t);
        }
        assert!("ATAC".parse::<LibraryType>().is_err());
    }
}
