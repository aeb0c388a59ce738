use std::fmt::Write;

use crate::scoring::{Recommendation, SessionAssessment};
use crate::storage::HistorySummary;
use crate::types::{AnalysisResult, HistoryRecord};

/// Tempo (min, sek) per km fra fart i m/s. 0 fart => (0, 0).
pub fn pace_per_km(speed_ms: f64) -> (u32, u32) {
    if !(speed_ms > 0.0) {
        return (0, 0);
    }
    let minutes = 1000.0 / speed_ms / 60.0;
    (minutes.trunc() as u32, (minutes.fract() * 60.0) as u32)
}

pub fn render_report(r: &AnalysisResult, a: &SessionAssessment, recs: &[Recommendation]) -> String {
    let mut out = String::new();
    let (pm, ps) = pace_per_km(r.avg_speed);

    // write! mot String kan ikke feile
    let _ = writeln!(out, "--- Session Report ---");
    let _ = writeln!(
        out,
        "Device: {}  |  Duration: {:.1} min  |  Steps: {}",
        r.device_name, r.duration_min, r.step_count
    );
    let _ = writeln!(out, "Running economy: {:>6.1} /100   [{}]", r.rei, a.rei.label());
    let _ = writeln!(out, "Ground shock:    {:>6.2} m/s²   [{}]", r.gss, a.gss.label());
    let _ = writeln!(out, "Cadence:         {:>6.1} spm    [{}]", r.cadence, a.cadence.label());
    let _ = writeln!(out, "Asymmetry:       {:>6.2} %      [{}]", r.asymmetry, a.asymmetry.label());
    let _ = writeln!(out, "Speed:           {:>6.2} m/s    ({}m{:02}s/km)", r.avg_speed, pm, ps);
    match r.fatigue_series.last() {
        Some(last) if r.fatigue_series.len() > 1 => {
            let _ = writeln!(
                out,
                "Fatigue index:   {:>6.2}        [{}] slope={:.5}",
                last.value,
                a.fatigue.label(),
                r.fatigue_slope
            );
        }
        _ => {
            let _ = writeln!(out, "Fatigue index:      N/A        [{}]", a.fatigue.label());
        }
    }

    let _ = writeln!(out, "--- Recommendations ---");
    for rec in recs {
        let _ = writeln!(out, "* {} ({}): {}", rec.title, rec.severity.label(), rec.text);
    }
    out
}

pub fn print_session_report(r: &AnalysisResult, a: &SessionAssessment, recs: &[Recommendation]) {
    print!("{}", render_report(r, a, recs));
}

pub fn render_history(records: &[HistoryRecord], summary: &HistorySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- History ({} sessions) ---", summary.sessions);
    let _ = writeln!(
        out,
        "Mean REI: {:.1}  |  Best REI: {}  |  Mean cadence: {:.0} spm  |  {:.1} h  |  ~{:.0} km",
        summary.mean_rei,
        summary.best_rei.map(|v| format!("{v:.0}")).unwrap_or_else(|| "-".into()),
        summary.mean_cadence,
        summary.total_hours,
        summary.estimated_km
    );
    for h in records {
        let _ = writeln!(
            out,
            "{}  {:>6.1} min  {:>5} steps  {:<14} REI {:>5.1}  GSS {:>5.2}  {:>5.1} spm  asym {:>5.2}%  {:.2} m/s",
            h.date, h.duration, h.steps, h.device, h.rei, h.gss, h.cadence, h.asymmetry, h.speed
        );
    }
    out
}
