// core/tests/test_steps.rs
use rungraph_core::config::{FilterConstants, HeightRule, PeakPolicy};
use rungraph_core::signal::condition;
use rungraph_core::steps::{
    detect_steps, find_peaks, local_maxima, min_spacing_samples, prominence,
};
use rungraph_core::synthetic::vertical_sine;

#[test]
fn local_maxima_takes_middle_of_plateau() {
    assert_eq!(local_maxima(&[0.0, 1.0, 2.0, 2.0, 2.0, 1.0, 0.0]), vec![3]);
    assert_eq!(local_maxima(&[0.0, 1.0, 1.0, 0.0]), vec![1]);
    // Kanter teller ikke som topper
    assert!(local_maxima(&[3.0, 2.0, 1.0]).is_empty());
    assert!(local_maxima(&[1.0, 2.0]).is_empty());
}

#[test]
fn prominence_against_both_sides() {
    let xs = [0.0, 1.0, 5.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0];
    assert!((prominence(&xs, 4) - 9.0).abs() < 1e-12);
    assert!((prominence(&xs, 2) - 5.0).abs() < 1e-12);

    // Dal mellom to topper: lavere topp får prominens ned til dalbunnen
    let ys = [0.0, 4.0, 2.0, 6.0, 0.0];
    assert!((prominence(&ys, 1) - 2.0).abs() < 1e-12);
}

#[test]
fn min_distance_is_enforced_in_time_order() {
    let xs = [0.0, 1.0, 5.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0];
    assert_eq!(find_peaks(&xs, 0.0, 3, 0.0), vec![2, 10]);
    assert_eq!(find_peaks(&xs, 4.0, 3, 0.0), vec![2]);
    assert_eq!(find_peaks(&xs, 0.0, 1, 4.0), vec![2, 4]);
}

#[test]
fn clean_running_signal_gives_expected_step_count() {
    // 60 s, 100 Hz, 2.83 Hz vertikal sinus => ~170 steg
    let consts = FilterConstants::default();
    let raw = vertical_sine(60.0, 100, 2.83, 0.8);
    let filtered = condition(&raw, &consts);
    let det = detect_steps(&filtered, &consts);

    let n = det.steps.len();
    assert!((153..=187).contains(&n), "expected 170 ± 10 %, got {n}");
    assert_eq!(det.policy.as_deref(), Some("strict"));
    assert!(!det.used_fallback);
    assert_eq!(det.envelope.len(), raw.len());
    assert_eq!(det.band_signal.len(), raw.len());

    for w in det.steps.windows(2) {
        assert!(w[1].time > w[0].time, "step times must be strictly increasing");
        assert!(w[1].time - w[0].time >= 0.27 - 1e-9, "steps closer than 0.27 s");
    }
    assert!(det.steps.iter().all(|s| s.impact.is_finite() && s.impact >= 0.0));
}

#[test]
fn fallback_policy_is_tried_when_first_finds_too_few() {
    let mut consts = FilterConstants::default();
    consts.peak_policies[0] = PeakPolicy {
        name: "impossible".into(),
        height: HeightRule::Percentile(100.0),
        prominence_std_factor: 1e6,
    };
    let raw = vertical_sine(30.0, 100, 2.83, 0.8);
    let filtered = condition(&raw, &consts);
    let det = detect_steps(&filtered, &consts);

    assert!(det.used_fallback);
    assert_eq!(det.policy.as_deref(), Some("relaxed"));
    assert!(det.steps.len() >= 4);
}

#[test]
fn very_short_recording_is_degenerate_not_an_error() {
    let consts = FilterConstants::default();
    let raw = vertical_sine(0.5, 100, 2.83, 0.8);
    let filtered = condition(&raw, &consts);
    let det = detect_steps(&filtered, &consts);
    assert!(det.steps.len() < 4);
}

#[test]
fn min_spacing_rounds_up_to_whole_samples() {
    assert_eq!(min_spacing_samples(100.0, 0.27), 27.0);
    assert_eq!(min_spacing_samples(60.0, 0.27), 17.0);
    assert_eq!(min_spacing_samples(75.0, 0.27), 21.0);
    assert_eq!(min_spacing_samples(90.0, 0.27), 25.0);
}

#[test]
fn step_spacing_holds_at_low_sample_rates() {
    // 3.7 Hz sinus => likerettede lober hver ~0.135 s; 0.27 s må holde også
    // når fs · 0.27 ikke er et heltall
    let consts = FilterConstants::default();
    for fs in [60, 75, 90] {
        let raw = vertical_sine(60.0, fs, 3.7, 0.8);
        let filtered = condition(&raw, &consts);
        let det = detect_steps(&filtered, &consts);

        assert!(det.steps.len() >= 50, "fs={fs}: only {} steps", det.steps.len());
        for w in det.steps.windows(2) {
            let gap = w[1].time - w[0].time;
            assert!(gap >= 0.27 - 1e-9, "fs={fs}: steps {gap:.4} s apart");
        }
    }
}
