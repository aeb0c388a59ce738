use chrono::{DateTime, Utc};
use log::{info, warn};
use rayon::prelude::*;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::fatigue::{cadence_over_time, classify_trend, fatigue_index, fatigue_slope};
use crate::gait::{
    cadence_and_asymmetry, ground_shock_score, impacts, running_economy_index, step_times,
};
use crate::metrics::Metrics;
use crate::models::SessionInput;
use crate::signal::condition;
use crate::stats::mean;
use crate::steps::detect_steps;
use crate::types::{AnalysisResult, MetricQuality, Validity};

/// Orkestrerer hele pipelinen for én økt:
/// kondisjoner → steg → REI/GSS/kadens/asymmetri → fatigue → fart → resultat.
///
/// Ingen skjult global tilstand utover den innsendte (uforanderlige)
/// konfigurasjonen; samme input + profil gir identisk resultat.
#[derive(Debug, Clone, Copy)]
pub struct SessionAnalyzer<'a> {
    config: &'a AnalysisConfig,
    metrics: Option<&'a Metrics>,
}

impl<'a> SessionAnalyzer<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config, metrics: None }
    }

    /// Tellere påvirker aldri resultatet, kun observasjon.
    pub fn with_metrics(mut self, metrics: &'a Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Analyser og stemple med nåtid.
    pub fn analyze(&self, input: &SessionInput) -> Result<AnalysisResult> {
        self.analyze_at(input, Utc::now())
    }

    /// Fullt deterministisk variant: tidsstempelet sendes inn.
    pub fn analyze_at(&self, input: &SessionInput, generated_at: DateTime<Utc>) -> Result<AnalysisResult> {
        let out = self.run(input, generated_at);
        if let Some(m) = self.metrics {
            match &out {
                Ok(r) => {
                    m.sessions_analyzed().inc();
                    if r.peak_policy.is_some() && r.peak_policy.as_deref() != self.first_policy_name() {
                        m.fallback_policy().inc();
                    }
                    m.degenerate_metrics().inc_by(count_defaulted(&r.quality));
                }
                Err(_) => m.analysis_errors().inc(),
            }
        }
        out
    }

    /// Uavhengige økter analyseres parallelt (rayon); rekkefølgen bevares.
    pub fn analyze_batch(&self, inputs: &[SessionInput]) -> Vec<Result<AnalysisResult>> {
        let now = Utc::now();
        inputs.par_iter().map(|input| self.analyze_at(input, now)).collect()
    }

    fn first_policy_name(&self) -> Option<&str> {
        self.config.filters.peak_policies.first().map(|p| p.name.as_str())
    }

    fn run(&self, input: &SessionInput, generated_at: DateTime<Utc>) -> Result<AnalysisResult> {
        // 0️⃣ Fail fast på konfig- og datafeil
        self.config.validate()?;
        input.validate()?;
        let profile = *self.config.devices.lookup(&input.device)?;
        let consts = &self.config.filters;

        // 1️⃣ Kondisjonering
        let filtered = condition(&input.accel, consts);

        // 2️⃣ Steg
        let detection = detect_steps(&filtered, consts);
        let steps = detection.steps;
        let imp = impacts(&steps);
        let times = step_times(&steps);

        // 3️⃣ Gangmetrikker
        let rei = running_economy_index(&filtered.z, &imp, consts.gravity);
        let gss = ground_shock_score(&imp);
        let ca = cadence_and_asymmetry(&times, consts);

        // 4️⃣ Fatigue + kadens over tid
        let session_start = filtered.time.first().copied().unwrap_or(0.0);
        let duration_secs = filtered.duration_secs();
        let fatigue_series = fatigue_index(&steps, session_start, duration_secs, consts);
        let slope = fatigue_slope(&fatigue_series);
        let fatigue_slope = slope.unwrap_or(0.0);
        let fatigue_trend = classify_trend(fatigue_slope, consts.trend_epsilon);
        let cadence_series = cadence_over_time(&times, consts);

        // 5️⃣ Snittfart: GPS hvis tilgjengelig, ellers steg/2 per sekund
        let avg_speed = match &input.gps {
            Some(gps) => mean(&gps.iter().map(|g| g.speed).collect::<Vec<_>>()),
            None if duration_secs > 0.0 => steps.len() as f64 / 2.0 / duration_secs,
            None => 0.0,
        };

        let quality = MetricQuality {
            cadence: ca.validity,
            asymmetry: ca.validity,
            rei_consistency: rei.consistency_validity,
            ground_shock: Validity::from_sufficient(!steps.is_empty()),
            fatigue_trend: Validity::from_sufficient(slope.is_some()),
            cadence_series: Validity::from_sufficient(!cadence_series.is_empty()),
        };
        if !quality.cadence.is_computed() {
            warn!("analyze: {} steps detected, cadence/asymmetry defaulted to 0.0", steps.len());
        }
        if !quality.fatigue_trend.is_computed() {
            warn!("analyze: {} fatigue windows, trend defaulted to stable", fatigue_series.len());
        }

        info!(
            "analyze: device={} fs={}Hz steps={} duration={:.2}min rei={} gss={} cadence={}",
            input.device,
            filtered.fs,
            steps.len(),
            duration_secs / 60.0,
            rei.value,
            gss,
            ca.cadence
        );

        Ok(AnalysisResult {
            rei: rei.value,
            gss,
            cadence: ca.cadence,
            asymmetry: ca.asymmetry,
            fatigue_series,
            fatigue_slope,
            fatigue_trend,
            cadence_series,
            step_count: steps.len(),
            duration_min: duration_secs / 60.0,
            avg_speed,
            device_name: input.device.clone(),
            gss_good: profile.good,
            gss_warn: profile.warn,
            peak_policy: detection.policy,
            quality,
            filtered,
            steps,
            generated_at,
        })
    }
}

fn count_defaulted(q: &MetricQuality) -> u64 {
    [
        q.cadence,
        q.asymmetry,
        q.rei_consistency,
        q.ground_shock,
        q.fatigue_trend,
        q.cadence_series,
    ]
    .iter()
    .filter(|v| !v.is_computed())
    .count() as u64
}

/// Bakoverkompatibel wrapper: analyser med standardkonfig.
pub fn analyze_session(input: &SessionInput) -> Result<AnalysisResult> {
    SessionAnalyzer::new(AnalysisConfig::shared_default()).analyze(input)
}
