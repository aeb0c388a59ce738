use serde::{Deserialize, Serialize};

use crate::types::{AnalysisResult, FatigueTrend, Tier};

/// Faste bånd for metrikker som ikke avhenger av sensorposisjon.
pub const REI_GOOD: (f64, f64) = (65.0, 100.0);
pub const REI_WARN: (f64, f64) = (40.0, 65.0);
pub const CADENCE_GOOD: (f64, f64) = (170.0, 185.0);
pub const CADENCE_WARN: (f64, f64) = (160.0, 195.0);
pub const ASYMMETRY_GOOD: (f64, f64) = (0.0, 5.0);
pub const ASYMMETRY_WARN: (f64, f64) = (5.0, 10.0);

/// Under denne kadensen gis "lav kadens"-råd i stedet for finjustering.
const LOW_CADENCE_SPM: f64 = 160.0;
const LOW_REI: f64 = 50.0;
const PROGRESSIVE_FATIGUE_SLOPE: f64 = 0.005;

/// Normal skala: innenfor good => optimal, innenfor warn => moderate.
pub fn classify_range(value: f64, good: (f64, f64), warn: (f64, f64)) -> Tier {
    if good.0 <= value && value <= good.1 {
        Tier::Optimal
    } else if warn.0 <= value && value <= warn.1 {
        Tier::Moderate
    } else {
        Tier::Review
    }
}

/// Invertert skala (lavere er bedre): kun øvre grenser teller.
pub fn classify_inverted(value: f64, good: (f64, f64), warn: (f64, f64)) -> Tier {
    if value <= good.1 {
        Tier::Optimal
    } else if value <= warn.1 {
        Tier::Moderate
    } else {
        Tier::Review
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAssessment {
    pub rei: Tier,
    pub gss: Tier,
    pub cadence: Tier,
    pub asymmetry: Tier,
    pub fatigue: FatigueTrend,
}

impl SessionAssessment {
    pub fn from_result(r: &AnalysisResult) -> Self {
        Self {
            rei: classify_range(r.rei, REI_GOOD, REI_WARN),
            gss: classify_inverted(r.gss, r.gss_good, r.gss_warn),
            cadence: classify_range(r.cadence, CADENCE_GOOD, CADENCE_WARN),
            asymmetry: classify_inverted(r.asymmetry, ASYMMETRY_GOOD, ASYMMETRY_WARN),
            fatigue: r.fatigue_trend,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    LowCadence,
    CadenceFineTune,
    HighImpact,
    Asymmetry,
    LowRei,
    ProgressiveFatigue,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub severity: Tier,
    pub title: String,
    pub text: String,
}

impl Recommendation {
    fn new(kind: RecommendationKind, severity: Tier, title: &str, text: String) -> Self {
        Self { kind, severity, title: title.to_string(), text }
    }
}

/// Coaching-råd i fast rekkefølge: kadens, impact, asymmetri, REI, fatigue.
/// Ingen funn => ett "utmerket økt"-råd.
pub fn recommendations(r: &AnalysisResult, a: &SessionAssessment) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if a.cadence != Tier::Optimal {
        if r.cadence < LOW_CADENCE_SPM {
            recs.push(Recommendation::new(
                RecommendationKind::LowCadence,
                Tier::Moderate,
                "Low cadence",
                format!(
                    "Your cadence ({:.0} spm) is below the optimal range. Try shortening your stride and running to 175-180 BPM music.",
                    r.cadence
                ),
            ));
        } else {
            recs.push(Recommendation::new(
                RecommendationKind::CadenceFineTune,
                Tier::Moderate,
                "Cadence can improve",
                "You are close to the ideal range (170-185 spm). Small adjustments can make the difference.".to_string(),
            ));
        }
    }

    if a.gss == Tier::Review {
        recs.push(Recommendation::new(
            RecommendationKind::HighImpact,
            Tier::Moderate,
            "High impact",
            format!(
                "GSS of {:.1} m/s² is high for this sensor position. Land with the foot under your centre of mass and raise cadence.",
                r.gss
            ),
        ));
    }

    if a.asymmetry != Tier::Optimal {
        recs.push(Recommendation::new(
            RecommendationKind::Asymmetry,
            a.asymmetry,
            "Asymmetry detected",
            format!(
                "{:.1}% difference between legs. Consider unilateral exercises and check for compensations.",
                r.asymmetry
            ),
        ));
    }

    if r.rei < LOW_REI {
        recs.push(Recommendation::new(
            RecommendationKind::LowRei,
            Tier::Review,
            "Low REI",
            "Excessive vertical motion. Work on technique: lean from the ankles and engage the core.".to_string(),
        ));
    }

    if r.fatigue_slope > PROGRESSIVE_FATIGUE_SLOPE {
        recs.push(Recommendation::new(
            RecommendationKind::ProgressiveFatigue,
            Tier::Moderate,
            "Progressive fatigue",
            "The fatigue index rises markedly. Review nutrition and hydration before the run.".to_string(),
        ));
    }

    if recs.is_empty() {
        recs.push(Recommendation::new(
            RecommendationKind::Excellent,
            Tier::Optimal,
            "Excellent session",
            "All indicators in optimal ranges. Stay consistent and keep monitoring.".to_string(),
        ));
    }
    recs
}
