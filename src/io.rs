use crate::config::ResidentProfile;
use crate::model::{Resident, ResidentId, ResidentYear};
use crate::scheduler::{LoadReport, ScheduleRow};
use crate::storage;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::io::Write;
use std::path::Path;

/// En-tête du planning exporté.
pub const SCHEDULE_HEADER: [&str; 3] = ["Date", "Junior Resident", "Senior Resident"];

const MONTH_COLUMNS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Import de résidents depuis CSV: header `name,year[,vacations]`
pub fn import_residents_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Resident>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        let year = rec.get(1).context("missing year")?.trim();
        if name.is_empty() {
            bail!("invalid resident row (empty name)");
        }
        let year: u8 = year
            .parse()
            .with_context(|| format!("invalid year for resident {name}"))?;
        let year = ResidentYear::try_from(year).map_err(anyhow::Error::msg)?;
        let mut vacation_days = Vec::new();
        if let Some(raw) = rec.get(2) {
            let raw = raw.trim();
            if !raw.is_empty() {
                vacation_days = parse_vacations(raw)
                    .with_context(|| format!("invalid vacations value for resident {name}"))?;
            }
        }
        out.push(Resident::with_id(ResidentId::random(), name, year, vacation_days));
    }
    Ok(out)
}

fn parse_vacations(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    let mut days = Vec::new();
    for chunk in raw.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        days.extend(parse_vacation_chunk(chunk)?);
    }
    Ok(days)
}

/// Une date, ou un intervalle inclusif `start..end` / `start/end`.
fn parse_vacation_chunk(chunk: &str) -> anyhow::Result<Vec<NaiveDate>> {
    if let Some((start_raw, end_raw)) = chunk.split_once("..").or_else(|| chunk.split_once('/')) {
        let start = parse_date(start_raw.trim())?;
        let end = parse_date(end_raw.trim())?;
        if end < start {
            bail!("vacation end must not be before start: {chunk}");
        }
        Ok(start.iter_days().take_while(|d| *d <= end).collect())
    } else {
        Ok(vec![parse_date(chunk)?])
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Écrit le planning en CSV: header `Date,Junior Resident,Senior Resident`
pub fn write_schedule_csv<W: Write>(writer: W, rows: &[ScheduleRow]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    w.write_record(SCHEDULE_HEADER)?;
    for row in rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        w.write_record([date.as_str(), row.junior.as_str(), row.senior.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du planning (écriture atomique)
pub fn export_schedule_csv<P: AsRef<Path>>(path: P, rows: &[ScheduleRow]) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    write_schedule_csv(&mut buf, rows)?;
    storage::write_atomic(path, &buf)
}

/// Écrit le bilan de charge: header `name,year,total,jan,...,dec`
pub fn write_loads_csv<W: Write>(writer: W, report: &[LoadReport]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_writer(writer);
    let header: Vec<&str> = ["name", "year", "total"]
        .into_iter()
        .chain(MONTH_COLUMNS)
        .collect();
    w.write_record(&header)?;
    for entry in report {
        let mut record = vec![
            entry.name.clone(),
            entry.year.to_string(),
            entry.total.to_string(),
        ];
        record.extend(entry.by_month.iter().map(u32::to_string));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du bilan de charge (écriture atomique)
pub fn export_loads_csv<P: AsRef<Path>>(path: P, report: &[LoadReport]) -> anyhow::Result<()> {
    let mut buf = Vec::new();
    write_loads_csv(&mut buf, report)?;
    storage::write_atomic(path, &buf)
}

/// Export JSON du planning (jolie mise en forme)
pub fn export_schedule_json<P: AsRef<Path>>(path: P, rows: &[ScheduleRow]) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(rows)?;
    storage::write_atomic(path, &json)
}

/// Écrit un profil de résident vierge.
pub fn export_resident_template<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(&ResidentProfile::template())?;
    storage::write_atomic(path, &json)
}
