use logdigest_aggregate::{append_reason, build_sample_rows, select, strip_reason};
use logdigest_classify::{is_alertable, is_failure, is_warning};
use logdigest_ids::{ObjectId, Version};
use logdigest_schema::digest::REASON_SEPARATOR;
use logdigest_schema::record::LogRecord;
use logdigest_template::qc::SampleProbes;
use logdigest_testkit::strategies::strategy_log_lines;
use proptest::prelude::*;
use std::path::PathBuf;

fn record(lines: Vec<String>) -> LogRecord {
    LogRecord::found(
        ObjectId::new("s1"),
        Version::Numbered(1),
        PathBuf::from("/w/process_sample.s1_GEX.v1.log"),
        lines,
    )
}

// ============================================================================
// Reason accumulation
// ============================================================================

proptest! {
    #[test]
    fn two_reasons_join_in_order(a in "ERROR [a-z ]{0,20}", b in "ERROR [a-z ]{0,20}") {
        let mut acc = String::new();
        append_reason(&mut acc, &a);
        append_reason(&mut acc, &b);
        prop_assert_eq!(acc, format!("{}{REASON_SEPARATOR}{}", strip_reason(&a), strip_reason(&b)));
    }

    #[test]
    fn failure_reason_lists_every_failure_line(lines in strategy_log_lines()) {
        let probes = SampleProbes::compile().unwrap();
        let rows = build_sample_rows(&[record(lines.clone())], &probes);
        let expected: Vec<&str> = lines
            .iter()
            .filter(|l| is_failure(l))
            .map(|l| strip_reason(l))
            .collect();
        prop_assert_eq!(rows[0].failed, !expected.is_empty());
        prop_assert_eq!(&rows[0].failure_reason, &expected.join(REASON_SEPARATOR));
    }

    #[test]
    fn warning_flag_matches_classifier(lines in strategy_log_lines()) {
        let probes = SampleProbes::compile().unwrap();
        let rows = build_sample_rows(&[record(lines.clone())], &probes);
        prop_assert_eq!(rows[0].warning, lines.iter().any(|l| is_warning(l)));
    }

    #[test]
    fn selection_is_empty_iff_nothing_alertable(lines in strategy_log_lines()) {
        let records = [record(lines.clone())];
        let sel = select(&records, &is_alertable);
        prop_assert_eq!(sel.is_empty(), !lines.iter().any(|l| is_alertable(l)));
    }
}
