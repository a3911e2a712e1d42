//! Fuzz harness for the sample row builder
//!
//! Arbitrary log bodies go through every probe; reasons must only be set
//! when the matching flag is.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logdigest_aggregate::sample_row;
use logdigest_ids::{ObjectId, Version};
use logdigest_schema::record::LogRecord;
use logdigest_template::qc::SampleProbes;
use std::path::PathBuf;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let record = LogRecord::found(
        ObjectId::new("1234"),
        Version::Numbered(1),
        PathBuf::from("process_sample.1234_GEX.v1.log"),
        body.lines().map(str::to_string).collect(),
    );
    let probes = SampleProbes::compile().expect("built-in templates compile");

    let row = sample_row(&record, &probes);
    assert_eq!(row.sample_id, "1234");
    if !row.failed {
        assert!(row.failure_reason.is_empty());
    }
    if !row.warning {
        assert!(row.warning_reason.is_empty());
    }
});
