use prometheus::{IntCounter, Opts, Registry};

/// Prometheus-tellere for analyseutfall. Egen `Registry` (aldri den globale),
/// slik at flere analysatorer/tester ikke kolliderer.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    sessions_analyzed: IntCounter,
    analysis_errors: IntCounter,
    fallback_policy: IntCounter,
    degenerate_metrics: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    let c = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(c.clone()))?;
    Ok(c)
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        Ok(Self {
            sessions_analyzed: counter(
                &registry,
                "rungraph_sessions_analyzed_total",
                "Sessions analyzed successfully",
            )?,
            analysis_errors: counter(
                &registry,
                "rungraph_analysis_errors_total",
                "Sessions rejected with a data error",
            )?,
            fallback_policy: counter(
                &registry,
                "rungraph_fallback_policy_total",
                "Sessions where a fallback peak policy produced the steps",
            )?,
            degenerate_metrics: counter(
                &registry,
                "rungraph_degenerate_metrics_total",
                "Metrics resolved to a default due to insufficient data",
            )?,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sessions_analyzed(&self) -> &IntCounter {
        &self.sessions_analyzed
    }

    pub fn analysis_errors(&self) -> &IntCounter {
        &self.analysis_errors
    }

    pub fn fallback_policy(&self) -> &IntCounter {
        &self.fallback_policy
    }

    pub fn degenerate_metrics(&self) -> &IntCounter {
        &self.degenerate_metrics
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("sessions_analyzed", &self.sessions_analyzed.get())
            .field("analysis_errors", &self.analysis_errors.get())
            .field("fallback_policy", &self.fallback_policy.get())
            .field("degenerate_metrics", &self.degenerate_metrics.get())
            .finish()
    }
}
