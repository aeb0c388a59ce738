use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rungraph_core::cli::{print_session_report, render_history};
use rungraph_core::ingest::{read_accel_csv, read_gps_csv};
use rungraph_core::synthetic::demo_session;
use rungraph_core::{
    recommendations, AnalysisConfig, AnalysisResult, HistorySummary, SessionAnalyzer,
    SessionAssessment, SessionHistory, SessionInput,
};

#[derive(Debug, Parser)]
#[command(name = "rungraph", about = "Running biomechanics from wearable accelerometer data")]
struct Cli {
    /// Valgfri konfig (JSON) som overstyrer standardverdiene
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyser én økt fra CSV
    Analyze {
        #[arg(long)]
        accel: PathBuf,
        #[arg(long)]
        gps: Option<PathBuf>,
        #[arg(long, default_value = "backpack")]
        device: String,
        /// Append resultatet til denne historikkfilen
        #[arg(long)]
        history: Option<PathBuf>,
        /// Skriv AnalysisResult som JSON i stedet for rapport
        #[arg(long)]
        json: bool,
    },
    /// Analyser en syntetisk demo-økt
    Demo {
        #[arg(long, default_value_t = 600)]
        duration: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value = "backpack")]
        device: String,
    },
    /// List sensorposisjoner
    Devices,
    /// Vis historikk
    History {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        last: Option<usize>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(p) => {
            let txt = std::fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            Ok(AnalysisConfig::from_json_str(&txt)?)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn report(result: &AnalysisResult) {
    let assessment = SessionAssessment::from_result(result);
    let recs = recommendations(result, &assessment);
    print_session_report(result, &assessment, &recs);
}

fn main() -> Result<()> {
    // RUST_LOG=debug for filter-/stegdetaljer
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let analyzer = SessionAnalyzer::new(&config);

    match cli.command {
        Command::Analyze { accel, gps, device, history, json } => {
            let accel_samples = read_accel_csv(
                File::open(&accel).with_context(|| format!("opening {}", accel.display()))?,
            )?;
            let gps_samples = match gps {
                Some(p) => Some(read_gps_csv(
                    File::open(&p).with_context(|| format!("opening {}", p.display()))?,
                )?),
                None => None,
            };
            let input = SessionInput::new(accel_samples, gps_samples, device);
            let result = analyzer.analyze(&input).context("analysis failed")?;

            if let Some(h) = history {
                SessionHistory::new(h).append(result.history_record())?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                report(&result);
            }
        }
        Command::Demo { duration, seed, device } => {
            let input = demo_session(duration, 100, seed, &device)?;
            let result = analyzer.analyze(&input).context("analysis failed")?;
            report(&result);
        }
        Command::Devices => {
            for name in config.devices.names() {
                if let Some(p) = config.devices.get(name) {
                    println!("{name}: good {:?}  warn {:?}", p.good, p.warn);
                }
            }
        }
        Command::History { file, last } => {
            let store = SessionHistory::new(file);
            let all = store.load()?;
            let summary = HistorySummary::from_records(&all);
            let shown = match last {
                Some(n) => store.last_n(n)?,
                None => all,
            };
            print!("{}", render_history(&shown, &summary));
        }
    }
    Ok(())
}
