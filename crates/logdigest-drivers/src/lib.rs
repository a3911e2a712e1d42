//! Drivers for the two kinds of processing log.
//!
//! A driver knows which objects a donor has and how their logs are named and
//! stored. Everything else about digestion is shared.

use anyhow::Result;
use itertools::Itertools;
use logdigest_ids::{LibraryType, ObjectId, Version};
use logdigest_ports::{DigestDriver, DigestMode, MetadataSource};
use std::fmt;
use std::str::FromStr;

pub const SAMPLE_CATEGORY: &str = "processed_samples";
pub const LIBRARY_CATEGORY: &str = "processed_libraries";

/// Which processing step's logs to digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessType {
    Sample,
    Library,
}

impl FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sample" => Ok(ProcessType::Sample),
            "library" => Ok(ProcessType::Library),
            other => Err(format!(
                "unknown process type {other:?} (expected sample or library)"
            )),
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessType::Sample => f.write_str("sample"),
            ProcessType::Library => f.write_str("library"),
        }
    }
}

/// Logs of `process_sample`, one per sample: `process_sample.{id}_GEX.{v}.log`.
pub struct SampleDriver<'a> {
    pub donor_id: String,
    pub metadata: &'a dyn MetadataSource,
}

impl<'a> SampleDriver<'a> {
    pub fn new(donor_id: impl Into<String>, metadata: &'a dyn MetadataSource) -> Self {
        Self {
            donor_id: donor_id.into(),
            metadata,
        }
    }
}

impl DigestDriver for SampleDriver<'_> {
    fn name(&self) -> &str {
        "sample"
    }

    fn object_ids(&self) -> Result<Vec<ObjectId>> {
        Ok(self
            .metadata
            .samples_for_donor(&self.donor_id)?
            .into_iter()
            .map(|s| ObjectId::new(s.sample_id))
            .collect())
    }

    fn object_prefix(&self, object_id: &ObjectId) -> String {
        format!("{object_id}_GEX")
    }

    fn log_file_name(&self, object_id: &ObjectId, version: &Version) -> String {
        format!("process_sample.{}.{version}.log", self.object_prefix(object_id))
    }

    fn remote_category(&self) -> &str {
        SAMPLE_CATEGORY
    }

    fn supports(&self, mode: DigestMode) -> bool {
        mode != DigestMode::LibraryMetrics
    }
}

/// Logs of `process_library`, one per library of any type:
/// `process_library.{donor}_{seq_run}_{TYPE}_{lib}.{v}.log`.
pub struct LibraryDriver<'a> {
    pub donor_id: String,
    pub seq_run: String,
    pub metadata: &'a dyn MetadataSource,
}

impl<'a> LibraryDriver<'a> {
    pub fn new(
        donor_id: impl Into<String>,
        seq_run: impl Into<String>,
        metadata: &'a dyn MetadataSource,
    ) -> Self {
        Self {
            donor_id: donor_id.into(),
            seq_run: seq_run.into(),
            metadata,
        }
    }
}

impl DigestDriver for LibraryDriver<'_> {
    fn name(&self) -> &str {
        "library"
    }

    /// Every library referenced by the donor's samples, GEX first, then BCR,
    /// then TCR. A library shared by several samples appears once.
    fn object_ids(&self) -> Result<Vec<ObjectId>> {
        let samples = self.metadata.samples_for_donor(&self.donor_id)?;
        let samples = &samples;
        Ok(LibraryType::ALL
            .into_iter()
            .flat_map(move |t| {
                samples.iter().flat_map(move |s| {
                    s.libraries(t)
                        .iter()
                        .map(move |id| ObjectId::library(t, id))
                })
            })
            .unique()
            .collect())
    }

    fn object_prefix(&self, object_id: &ObjectId) -> String {
        format!("{}_{}_{object_id}", self.donor_id, self.seq_run)
    }

    fn log_file_name(&self, object_id: &ObjectId, version: &Version) -> String {
        format!("process_library.{}.{version}.log", self.object_prefix(object_id))
    }

    fn remote_category(&self) -> &str {
        LIBRARY_CATEGORY
    }

    fn supports(&self, mode: DigestMode) -> bool {
        mode != DigestMode::SampleCsv
    }
}

/// Driver for `process_type` over `metadata`.
pub fn driver_for<'a>(
    process_type: ProcessType,
    donor_id: &str,
    seq_run: &str,
    metadata: &'a dyn MetadataSource,
) -> Box<dyn DigestDriver + 'a> {
    match process_type {
        ProcessType::Sample => Box::new(SampleDriver::new(donor_id, metadata)),
        ProcessType::Library => Box::new(LibraryDriver::new(donor_id, seq_run, metadata)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logdigest_ids::sample_id_from_file_name;
    use logdigest_ports::SampleRecord;
    use logdigest_testkit::StaticMetadata;

    fn sheet() -> StaticMetadata {
        StaticMetadata::new(vec![
            SampleRecord {
                sample_id: "582C-BMA-1".into(),
                donor_id: "582C".into(),
                gex_libs: vec!["L1".into(), "L2".into()],
                bcr_libs: vec!["L3".into()],
                tcr_libs: vec![],
            },
            SampleRecord {
                sample_id: "582C-SPL-1".into(),
                donor_id: "582C".into(),
                gex_libs: vec!["L2".into()],
                bcr_libs: vec![],
                tcr_libs: vec!["L4".into()],
            },
            SampleRecord {
                sample_id: "640C-LNG-1".into(),
                donor_id: "640C".into(),
                gex_libs: vec!["L9".into()],
                ..SampleRecord::default()
            },
        ])
    }

    #[test]
    fn sample_driver_naming() {
        let meta = sheet();
        let d = SampleDriver::new("582C", &meta);
        let ids = d.object_ids().unwrap();
        assert_eq!(ids, vec![ObjectId::new("582C-BMA-1"), ObjectId::new("582C-SPL-1")]);

        let name = d.log_file_name(&ObjectId::new("1234"), &Version::Numbered(3));
        assert_eq!(name, "process_sample.1234_GEX.v3.log");
        assert_eq!(sample_id_from_file_name(&name), Some("1234"));
        assert_eq!(d.remote_category(), "processed_samples");
        assert!(d.supports(DigestMode::SampleCsv));
        assert!(!d.supports(DigestMode::LibraryMetrics));
    }

    #[test]
    fn library_ids_are_deduplicated_and_typed() {
        let meta = sheet();
        let d = LibraryDriver::new("582C", "001", &meta);
        let ids: Vec<String> = d
            .object_ids()
            .unwrap()
            .into_iter()
            .map(|i| i.0)
            .collect();
        assert_eq!(ids, vec!["GEX_L1", "GEX_L2", "BCR_L3", "TCR_L4"]);
    }

    #[test]
    fn library_driver_naming() {
        let meta = sheet();
        let d = LibraryDriver::new("582C", "001", &meta);
        let id = ObjectId::library(LibraryType::Bcr, "L3");
        assert_eq!(d.object_prefix(&id), "582C_001_BCR_L3");
        assert_eq!(
            d.log_file_name(&id, &Version::Unresolved),
            "process_library.582C_001_BCR_L3.v-1.log"
        );
        assert_eq!(d.remote_category(), "processed_libraries");
        assert!(!d.supports(DigestMode::SampleCsv));
        assert!(d.supports(DigestMode::LibraryMetrics));
    }

    #[test]
    fn process_type_parses() {
        assert_eq!("sample".parse::<ProcessType>().unwrap(), ProcessType::Sample);
        assert_eq!("library".parse::<ProcessType>().unwrap(), ProcessType::Library);
        assert!("Sample".parse::<ProcessType>().is_err());
    }

    #[test]
    fn driver_for_picks_the_variant() {
        let meta = sheet();
        assert_eq!(driver_for(ProcessType::Sample, "582C", "001", &meta).name(), "sample");
        assert_eq!(driver_for(ProcessType::Library, "582C", "001", &meta).name(), "library");
    }
}
