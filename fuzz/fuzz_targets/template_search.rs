//! Fuzz harness for `{}` templates
//!
//! Splits the input into a template and a line at the first newline, then
//! compiles and searches. A match must yield exactly one value per slot, and
//! each value must come back from `extract` at its index.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logdigest_template::Template;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let (template, line) = input.split_once('\n').unwrap_or((input, ""));

    let Ok(compiled) = Template::compile(template) else {
        return;
    };
    if let Some(values) = compiled.search(line) {
        assert_eq!(values.len(), compiled.slots());
        for (i, v) in values.iter().enumerate() {
            assert_eq!(compiled.extract(line, i).as_deref(), Some(v.as_str()));
        }
    }
});
