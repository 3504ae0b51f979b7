//! End-to-end run of both harnesses against the core.

use chainalloc_harness::report::CorrectnessReport;
use chainalloc_harness::{grind, scenarios};

#[test]
fn full_correctness_campaign_passes() {
    let report = CorrectnessReport::new("integration", scenarios::run_all());
    assert!(
        report.all_passed(),
        "failing scenarios:\n{}",
        report.render_text()
    );
    assert_eq!(report.scenarios.len(), 6);
}

#[test]
fn grind_run_is_leak_free_and_serializable() {
    let report = grind::run_all(3);
    assert!(!report.leaking);
    let json = serde_json::to_string(&report).expect("grind report serializes");
    assert!(json.contains("fragmentation_churn"));
}
