//! Innlesing av sensordata fra CSV (telefonapper, loggere).
//!
//! Kolonnenavn normaliseres via en ren alias-funksjon; den numeriske
//! pipelinen ser kun kanoniske `RawAccelSample`/`RawGpsSample`.

use std::collections::HashMap;
use std::io::Read;

use log::debug;

use crate::error::{AnalysisError, Result};
use crate::models::{RawAccelSample, RawGpsSample};
use crate::stats::median;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Time,
    X,
    Y,
    Z,
    Speed,
}

/// Epoch-tider over denne medianen tolkes som nanosekunder.
const NANOS_EPOCH_THRESHOLD: f64 = 1e12;

/// Kanonisk felt for et kolonnenavn (case/whitespace-ufølsomt).
pub fn canonical_column(name: &str) -> Option<Column> {
    let n = name.trim().to_lowercase();
    match n.as_str() {
        "x" | "accel_x" | "acceleration x (m/s^2)" => Some(Column::X),
        "y" | "accel_y" | "acceleration y (m/s^2)" => Some(Column::Y),
        "z" | "accel_z" | "acceleration z (m/s^2)" => Some(Column::Z),
        "speed" | "velocity" => Some(Column::Speed),
        "seconds_elapsed" => Some(Column::Time),
        _ if n.contains("time") => Some(Column::Time),
        _ => None,
    }
}

/// Hvordan tidskolonnen skal tolkes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeKind {
    /// `seconds_elapsed`: allerede sekunder fra start
    Elapsed,
    /// annen "*time*"-kolonne: kan være epoch (ns) og rebases til 0
    Absolute,
}

/// Kolonne-indekser per kanonisk felt. `seconds_elapsed` foretrekkes som
/// tid; ellers vinner første treff.
fn resolve_columns(headers: &csv::StringRecord) -> (HashMap<Column, usize>, Option<TimeKind>) {
    let mut map = HashMap::new();
    let mut time_kind = None;
    for (i, h) in headers.iter().enumerate() {
        let Some(col) = canonical_column(h) else { continue };
        if col == Column::Time {
            if h.trim().eq_ignore_ascii_case("seconds_elapsed") {
                map.insert(col, i);
                time_kind = Some(TimeKind::Elapsed);
            } else if time_kind.is_none() {
                map.insert(col, i);
                time_kind = Some(TimeKind::Absolute);
            }
        } else {
            map.entry(col).or_insert(i);
        }
    }
    (map, time_kind)
}

fn parse_field(rec: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| rec.get(i))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn normalize_times(raw: &mut [f64], kind: TimeKind) {
    if kind == TimeKind::Elapsed || raw.is_empty() {
        return;
    }
    if median(raw) > NANOS_EPOCH_THRESHOLD {
        raw.iter_mut().for_each(|t| *t /= 1e9);
    }
    let t0 = raw[0];
    raw.iter_mut().for_each(|t| *t -= t0);
}

struct Table {
    columns: HashMap<Column, usize>,
    time_kind: TimeKind,
    rows: Vec<(f64, csv::StringRecord)>,
}

fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let (columns, time_kind) = resolve_columns(&headers);
    let time_kind = time_kind.ok_or(AnalysisError::MissingColumn { column: "time" })?;
    let time_idx = columns.get(&Column::Time).copied();

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let rec = record?;
        // Rader uten gyldig tid forkastes
        match parse_field(&rec, time_idx) {
            Some(t) => rows.push((t, rec)),
            None => dropped += 1,
        }
    }
    debug!("ingest: {} rows, {} dropped without time", rows.len(), dropped);

    let mut times: Vec<f64> = rows.iter().map(|(t, _)| *t).collect();
    normalize_times(&mut times, time_kind);
    for ((t, _), nt) in rows.iter_mut().zip(times) {
        *t = nt;
    }
    Ok(Table { columns, time_kind, rows })
}

/// Les akselerometer-CSV. Krever tid + z; x/y er valgfrie.
/// Ugyldige akseverdier blir manglende (x/y) eller 0.0 (z).
pub fn read_accel_csv<R: Read>(reader: R) -> Result<Vec<RawAccelSample>> {
    let table = read_table(reader)?;
    let z_idx = table
        .columns
        .get(&Column::Z)
        .copied()
        .ok_or(AnalysisError::MissingColumn { column: "z" })?;
    let x_idx = table.columns.get(&Column::X).copied();
    let y_idx = table.columns.get(&Column::Y).copied();
    debug!("ingest: accel time column kind {:?}", table.time_kind);

    Ok(table
        .rows
        .iter()
        .map(|(t, rec)| RawAccelSample {
            t: *t,
            x: parse_field(rec, x_idx),
            y: parse_field(rec, y_idx),
            z: parse_field(rec, Some(z_idx)).unwrap_or(0.0),
        })
        .collect())
}

/// Les GPS-CSV. Krever tid + fart; rader uten gyldig fart forkastes.
pub fn read_gps_csv<R: Read>(reader: R) -> Result<Vec<RawGpsSample>> {
    let table = read_table(reader)?;
    let speed_idx = table
        .columns
        .get(&Column::Speed)
        .copied()
        .ok_or(AnalysisError::MissingColumn { column: "speed" })?;

    Ok(table
        .rows
        .iter()
        .filter_map(|(t, rec)| parse_field(rec, Some(speed_idx)).map(|speed| RawGpsSample { t: *t, speed }))
        .collect())
}
