use trendlog_telemetry::{
    metrics, new_run_id, record_parameter_done, record_parameter_empty, record_upload_latency_ms,
};

#[test]
fn run_ids_are_unique() {
    let first = new_run_id();
    let second = new_run_id();
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn counters_accumulate() {
    let before = metrics().snapshot();
    record_parameter_done(5);
    record_parameter_empty();
    record_upload_latency_ms(12);
    let after = metrics().snapshot();
    assert!(after.parameters_done >= before.parameters_done + 1);
    assert!(after.readings_uploaded >= before.readings_uploaded + 5);
    assert!(after.parameters_empty >= before.parameters_empty + 1);
    assert!(after.upload_latency_ms_total >= before.upload_latency_ms_total + 12);
    assert!(after.upload_latency_ms_count >= before.upload_latency_ms_count + 1);
}
