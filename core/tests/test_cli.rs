use rungraph_core::cli::{pace_per_km, render_history, render_report};
use rungraph_core::synthetic::vertical_sine;
use rungraph_core::{
    analyze_session, recommendations, HistorySummary, SessionAssessment, SessionInput,
};

#[test]
fn pace_from_speed() {
    // 3.0 m/s => 5:33 min/km
    assert_eq!(pace_per_km(3.0), (5, 33));
    assert_eq!(pace_per_km(2.5), (6, 40));
    assert_eq!(pace_per_km(0.0), (0, 0));
    assert_eq!(pace_per_km(f64::NAN), (0, 0));
}

#[test]
fn report_lists_metrics_and_advice() {
    let input = SessionInput::new(vertical_sine(60.0, 100, 2.83, 0.8), None, "backpack");
    let r = analyze_session(&input).unwrap();
    let a = SessionAssessment::from_result(&r);
    let recs = recommendations(&r, &a);
    let text = render_report(&r, &a, &recs);

    assert!(text.starts_with("--- Session Report ---"));
    assert!(text.contains("Device: backpack"));
    assert!(text.contains("Running economy:"));
    assert!(text.contains("--- Recommendations ---"));
    // Kun ett fatigue-vindu => ingen trendverdi
    assert!(text.contains("N/A"));
    for rec in &recs {
        assert!(text.contains(&rec.title));
    }
}

#[test]
fn history_view_has_one_line_per_session() {
    let input = SessionInput::new(vertical_sine(30.0, 100, 2.83, 0.8), None, "wrist");
    let r = analyze_session(&input).unwrap();
    let records = vec![r.history_record(), r.history_record()];
    let summary = HistorySummary::from_records(&records);

    let text = render_history(&records, &summary);
    assert!(text.starts_with("--- History (2 sessions) ---"));
    assert_eq!(text.lines().filter(|l| l.contains("wrist")).count(), 2);
}
