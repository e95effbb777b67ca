//! CSV loaders for the three instrument records and CSV output.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::Deserialize;

use lumi_case::GaugeSeries;
use lumi_psd::{BinGrid, PsdTable};
use lumi_timeseries::{AlignedTable, TimeSeries, Timestamp};
use lumi_vfit::{VelocityPoint, VelocityPointCloud, VfitConfig};

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_time(raw: &str) -> Result<Timestamp> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp: {raw}"))
}

#[derive(Debug, Deserialize)]
struct GaugeRecord {
    time: String,
    amount: f64,
}

/// Reads a gauge record: one row per sample, `time,amount` in mm.
pub fn read_gauge(path: &Path) -> Result<GaugeSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open gauge file: {}", path.display()))?;
    let mut pairs = Vec::new();
    for record in reader.deserialize() {
        let record: GaugeRecord = record?;
        pairs.push((parse_time(&record.time)?, record.amount));
    }
    Ok(GaugeSeries::new(TimeSeries::from_pairs(pairs)?))
}

#[derive(Debug, Deserialize)]
struct VelocityRecord {
    time: String,
    particle_id: u32,
    diameter: f64,
    velocity: f64,
}

/// Reads particle observations: `time,particle_id,diameter,velocity`.
/// The quality cut and diameter correction are applied on construction.
pub fn read_velocity(path: &Path, config: &VfitConfig) -> Result<VelocityPointCloud> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open velocity file: {}", path.display()))?;
    let mut points = Vec::new();
    for record in reader.deserialize() {
        let record: VelocityRecord = record?;
        points.push(VelocityPoint {
            time: parse_time(&record.time)?,
            particle_id: record.particle_id,
            diameter: record.diameter,
            velocity: record.velocity,
        });
    }
    Ok(VelocityPointCloud::from_observations(points, config)?)
}

/// Reads a PSD table: a `time` column followed by one column per bin,
/// headed by the bin center in mm. Bin widths are the center spacings;
/// empty cells read as NaN.
pub fn read_psd(path: &Path) -> Result<PsdTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open PSD file: {}", path.display()))?;
    let headers = reader.headers()?.clone();
    if headers.len() < 3 {
        bail!("PSD file needs a time column and at least two bin columns");
    }
    let centers: Vec<f64> = headers
        .iter()
        .skip(1)
        .map(|h| {
            h.trim()
                .parse::<f64>()
                .with_context(|| format!("non-numeric bin center in header: {h}"))
        })
        .collect::<Result<_>>()?;
    let mut widths: Vec<f64> = centers.windows(2).map(|w| w[1] - w[0]).collect();
    widths.insert(0, widths[0]);

    let mut times = Vec::new();
    let mut data = Vec::new();
    for record in reader.records() {
        let record = record?;
        times.push(parse_time(&record[0])?);
        for field in record.iter().skip(1) {
            let field = field.trim();
            if field.is_empty() {
                data.push(f64::NAN);
            } else {
                data.push(
                    field
                        .parse()
                        .with_context(|| format!("non-numeric concentration: {field}"))?,
                );
            }
        }
    }
    let values = Array2::from_shape_vec((times.len(), centers.len()), data)
        .context("ragged PSD rows")?;
    Ok(PsdTable::new(times, BinGrid::new(centers, widths)?, values)?)
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let file = std::fs::File::create(p)
                .with_context(|| format!("failed to create output file: {}", p.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(std::io::stdout())),
    }
}

/// Writes an aligned table as CSV with a leading RFC 3339 time column.
pub fn write_table(path: Option<&PathBuf>, table: &AlignedTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(open_output(path)?);
    let mut header = vec!["time".to_string()];
    header.extend(table.names().iter().cloned());
    writer.write_record(&header)?;
    for (i, time) in table.times().iter().enumerate() {
        let mut row = vec![time.to_rfc3339()];
        for c in 0..table.n_columns() {
            row.push(table.column(c)[i].to_string());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one named series as two-column CSV.
pub fn write_series(path: Option<&PathBuf>, name: &str, series: &TimeSeries<f64>) -> Result<()> {
    let mut writer = csv::Writer::from_writer(open_output(path)?);
    writer.write_record(["time", name])?;
    for (time, value) in series.iter() {
        writer.write_record([time.to_rfc3339(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_time_accepts_offsets() {
        let t = parse_time("2014-02-01T02:00:00+02:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2014, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_time_rejects_garbage() {
        assert!(parse_time("yesterday").is_err());
    }
}
