//! Fuzz harness for log file name parsing
//!
//! Any text, including paths with either separator, must parse without
//! panicking, and whatever comes back must be a slice of the bare name.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logdigest_ids::{Version, file_name_of, library_from_file_name, sample_id_from_file_name};

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    let name = file_name_of(path);
    assert!(!name.contains('/'));
    if let Some(id) = sample_id_from_file_name(path) {
        assert!(name.contains(id));
    }
    if let Some((lib_type, lib_id)) = library_from_file_name(path) {
        assert!(name.contains(lib_type) && name.contains(lib_id));
    }
    if let Ok(v) = path.parse::<Version>() {
        assert_eq!(v.to_string().parse::<Version>().ok(), Some(v));
    }
});
